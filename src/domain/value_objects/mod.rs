//! Value objects - Immutable objects defined by their attributes

mod emotion;
mod ids;
mod position;
mod rules;
mod vocabulary;

pub use emotion::Emotion;
pub use ids::*;
pub use position::{Facing, Position};
pub use rules::SimulationRules;
pub use vocabulary::VocabularyEntry;
