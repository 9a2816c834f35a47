//! Aggregates - Cluster of domain objects treated as a single unit

pub mod cafe_state;

pub use cafe_state::{CafeState, SessionMode};
