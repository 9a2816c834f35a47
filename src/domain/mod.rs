//! Domain layer - Core simulation rules with no I/O
//!
//! This layer contains:
//! - Entities: GridWorld, Npc, Mission, Player, Item
//! - Value Objects: ids, positions, emotions, vocabulary, simulation rules
//! - Aggregates: CafeState aggregate root
//! - Domain Events: State changes and notifications
//! - Domain Services: movement, interaction and mission rules

pub mod aggregates;
pub mod entities;
pub mod events;
pub mod services;
pub mod value_objects;
