//! Data Transfer Objects - Dialogue requests, replies and wire formats
//!
//! Wire structs mirror the JSON the dialogue model returns and are converted
//! into plain reply types before anything touches the simulation.

pub mod dialogue;

pub use dialogue::*;
