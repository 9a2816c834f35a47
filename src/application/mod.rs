//! Application layer - Use cases over the domain model
//!
//! - Ports: interfaces to external systems (the dialogue model)
//! - DTOs: dialogue requests and replies
//! - Services: tick drivers, player control, session orchestration, dialogue

pub mod dto;
pub mod ports;
pub mod services;
