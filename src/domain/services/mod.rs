//! Domain services - Pure rules that span several entities

pub mod interaction_resolver;
pub mod mission_tracker;
pub mod movement_planner;

pub use interaction_resolver::resolve_target;
pub use movement_planner::next_step;
