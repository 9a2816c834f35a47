//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Layered application configuration
//! - Seed: The cafe floor plan, roster and missions
//! - Ollama: LLM integration for NPC dialogue
//! - Tick workers: Periodic wander and consumption drivers
//! - Console: Line-command front end
//! - State: Shared application state

pub mod config;
pub mod console;
pub mod ollama;
pub mod seed;
pub mod state;
pub mod tick_workers;
