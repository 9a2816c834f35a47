//! Mission entity - Cafe tasks the player works through

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{MissionId, NpcId};

/// How a mission gets completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionObjective {
    /// Have this many customers waiting on orders at the same time
    TakeOrders { count: usize },
    /// Deliver one correct order
    ServeOrder,
    /// Interact with a specific NPC or object and say its trigger
    VisitObject,
}

/// A mission shown in the HUD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    pub description: String,
    pub objective: MissionObjective,
    pub required_npc_id: Option<NpcId>,
    is_completed: bool,
}

impl Mission {
    pub fn new(
        id: impl Into<MissionId>,
        title: impl Into<String>,
        description: impl Into<String>,
        objective: MissionObjective,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            objective,
            required_npc_id: None,
            is_completed: false,
        }
    }

    pub fn with_required_npc(mut self, npc_id: impl Into<NpcId>) -> Self {
        self.required_npc_id = Some(npc_id.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Mark the mission done. Returns true only on the first completion;
    /// completion never reverts.
    pub fn complete(&mut self) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        true
    }
}
