//! Tunable constants of the cafe simulation

use serde::{Deserialize, Serialize};

/// Tick counts and rewards that drive the NPC lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRules {
    /// Wander ticks an NPC idles after reaching its destination
    pub idle_reset_ticks: u32,
    /// Consumption ticks a served beverage lasts, must be positive
    pub consumption_ticks: u32,
    /// Consumption ticks between finishing a drink and leaving the cafe
    pub leaving_ticks: u32,
    /// Experience granted for serving the right order
    pub serve_xp_reward: u32,
    /// Experience per player level, must be positive
    pub level_xp_step: u32,
    /// Customers that must be waiting at once for the order mission
    pub order_mission_threshold: usize,
    /// Consumption ticks a customer waits for an order before giving up.
    /// `None` means customers wait forever.
    pub order_patience_ticks: Option<u32>,
}

impl Default for SimulationRules {
    fn default() -> Self {
        Self {
            idle_reset_ticks: 4,
            consumption_ticks: 40,
            leaving_ticks: 5,
            serve_xp_reward: 20,
            level_xp_step: 50,
            order_mission_threshold: 3,
            order_patience_ticks: None,
        }
    }
}
