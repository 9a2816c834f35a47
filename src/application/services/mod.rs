//! Application services - Use case implementations
//!
//! The simulator and player controller hold the tick and movement rules,
//! the session ties them together with orders and conversations, and the
//! dialogue service talks to the language model through `LlmPort`.

pub mod cafe_session;
pub mod dialogue_service;
pub mod llm;
pub mod npc_simulator;
pub mod player_controller;

pub use cafe_session::{CafeError, CafeSession};
pub use dialogue_service::DialogueService;
