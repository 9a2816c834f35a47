//! Domain events - Notifications of significant state changes
//!
//! Every tick and every player command returns the events it caused. The
//! tick workers and console log them; tests assert on them.

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ConversationId, MissionId, NpcId, Position};

/// Base data for all events
#[derive(Debug, Clone)]
pub struct EventMetadata {
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
        }
    }
}

/// All domain events in the simulation
#[derive(Debug, Clone)]
pub enum DomainEvent {
    // ========================================================================
    // Wander Events
    // ========================================================================

    /// An idle NPC picked a new destination
    NpcStartedWandering {
        metadata: EventMetadata,
        npc_id: NpcId,
        target: Position,
    },

    /// An NPC stepped one cell toward its destination
    NpcStepped {
        metadata: EventMetadata,
        npc_id: NpcId,
        from: Position,
        to: Position,
    },

    /// A moving NPC reached its destination
    NpcArrived {
        metadata: EventMetadata,
        npc_id: NpcId,
        at: Position,
    },

    // ========================================================================
    // Order Events
    // ========================================================================

    /// A customer placed an order
    OrderTaken {
        metadata: EventMetadata,
        npc_id: NpcId,
        item_name: String,
    },

    /// A customer received the item they ordered
    OrderFulfilled {
        metadata: EventMetadata,
        npc_id: NpcId,
        item_name: String,
    },

    /// A customer gave up waiting for an order
    OrderAbandoned {
        metadata: EventMetadata,
        npc_id: NpcId,
        item_name: String,
    },

    /// An NPC finished their drink
    ConsumptionFinished {
        metadata: EventMetadata,
        npc_id: NpcId,
    },

    /// A non-permanent NPC is heading out
    NpcStartedLeaving {
        metadata: EventMetadata,
        npc_id: NpcId,
    },

    /// A leaving NPC was removed from the cafe
    NpcDeparted {
        metadata: EventMetadata,
        npc_id: NpcId,
    },

    // ========================================================================
    // Player Events
    // ========================================================================

    /// The player moved one cell
    PlayerMoved {
        metadata: EventMetadata,
        from: Position,
        to: Position,
    },

    /// The NPC the player may talk to changed
    InteractionTargetChanged {
        metadata: EventMetadata,
        npc_id: Option<NpcId>,
    },

    /// The player earned experience
    ExperienceGained {
        metadata: EventMetadata,
        amount: u32,
        total: u32,
    },

    /// An item moved into the player's inventory
    ItemReceived {
        metadata: EventMetadata,
        item_name: String,
    },

    /// New words were added to the player's vocabulary
    VocabularyLearned {
        metadata: EventMetadata,
        words: Vec<String>,
    },

    // ========================================================================
    // Conversation Events
    // ========================================================================

    /// A conversation with an NPC opened
    ConversationStarted {
        metadata: EventMetadata,
        conversation_id: ConversationId,
        npc_id: NpcId,
    },

    /// A conversation closed and the session returned to exploring
    ConversationEnded {
        metadata: EventMetadata,
        conversation_id: ConversationId,
        npc_id: NpcId,
    },

    // ========================================================================
    // Mission Events
    // ========================================================================

    /// A mission flipped to completed
    MissionCompleted {
        metadata: EventMetadata,
        mission_id: MissionId,
    },
}

impl DomainEvent {
    /// Get the metadata for this event
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            DomainEvent::NpcStartedWandering { metadata, .. } => metadata,
            DomainEvent::NpcStepped { metadata, .. } => metadata,
            DomainEvent::NpcArrived { metadata, .. } => metadata,
            DomainEvent::OrderTaken { metadata, .. } => metadata,
            DomainEvent::OrderFulfilled { metadata, .. } => metadata,
            DomainEvent::OrderAbandoned { metadata, .. } => metadata,
            DomainEvent::ConsumptionFinished { metadata, .. } => metadata,
            DomainEvent::NpcStartedLeaving { metadata, .. } => metadata,
            DomainEvent::NpcDeparted { metadata, .. } => metadata,
            DomainEvent::PlayerMoved { metadata, .. } => metadata,
            DomainEvent::InteractionTargetChanged { metadata, .. } => metadata,
            DomainEvent::ExperienceGained { metadata, .. } => metadata,
            DomainEvent::ItemReceived { metadata, .. } => metadata,
            DomainEvent::VocabularyLearned { metadata, .. } => metadata,
            DomainEvent::ConversationStarted { metadata, .. } => metadata,
            DomainEvent::ConversationEnded { metadata, .. } => metadata,
            DomainEvent::MissionCompleted { metadata, .. } => metadata,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::NpcStartedWandering { .. } => "NpcStartedWandering",
            DomainEvent::NpcStepped { .. } => "NpcStepped",
            DomainEvent::NpcArrived { .. } => "NpcArrived",
            DomainEvent::OrderTaken { .. } => "OrderTaken",
            DomainEvent::OrderFulfilled { .. } => "OrderFulfilled",
            DomainEvent::OrderAbandoned { .. } => "OrderAbandoned",
            DomainEvent::ConsumptionFinished { .. } => "ConsumptionFinished",
            DomainEvent::NpcStartedLeaving { .. } => "NpcStartedLeaving",
            DomainEvent::NpcDeparted { .. } => "NpcDeparted",
            DomainEvent::PlayerMoved { .. } => "PlayerMoved",
            DomainEvent::InteractionTargetChanged { .. } => "InteractionTargetChanged",
            DomainEvent::ExperienceGained { .. } => "ExperienceGained",
            DomainEvent::ItemReceived { .. } => "ItemReceived",
            DomainEvent::VocabularyLearned { .. } => "VocabularyLearned",
            DomainEvent::ConversationStarted { .. } => "ConversationStarted",
            DomainEvent::ConversationEnded { .. } => "ConversationEnded",
            DomainEvent::MissionCompleted { .. } => "MissionCompleted",
        }
    }

    /// Events worth surfacing at info level rather than debug
    pub fn is_notable(&self) -> bool {
        !matches!(
            self,
            DomainEvent::NpcStepped { .. }
                | DomainEvent::NpcStartedWandering { .. }
                | DomainEvent::NpcArrived { .. }
                | DomainEvent::PlayerMoved { .. }
        )
    }

    pub fn npc_started_wandering(npc_id: NpcId, target: Position) -> Self {
        DomainEvent::NpcStartedWandering {
            metadata: EventMetadata::default(),
            npc_id,
            target,
        }
    }

    pub fn npc_stepped(npc_id: NpcId, from: Position, to: Position) -> Self {
        DomainEvent::NpcStepped {
            metadata: EventMetadata::default(),
            npc_id,
            from,
            to,
        }
    }

    pub fn npc_arrived(npc_id: NpcId, at: Position) -> Self {
        DomainEvent::NpcArrived {
            metadata: EventMetadata::default(),
            npc_id,
            at,
        }
    }

    pub fn order_taken(npc_id: NpcId, item_name: impl Into<String>) -> Self {
        DomainEvent::OrderTaken {
            metadata: EventMetadata::default(),
            npc_id,
            item_name: item_name.into(),
        }
    }

    pub fn order_fulfilled(npc_id: NpcId, item_name: impl Into<String>) -> Self {
        DomainEvent::OrderFulfilled {
            metadata: EventMetadata::default(),
            npc_id,
            item_name: item_name.into(),
        }
    }

    pub fn order_abandoned(npc_id: NpcId, item_name: impl Into<String>) -> Self {
        DomainEvent::OrderAbandoned {
            metadata: EventMetadata::default(),
            npc_id,
            item_name: item_name.into(),
        }
    }

    pub fn consumption_finished(npc_id: NpcId) -> Self {
        DomainEvent::ConsumptionFinished {
            metadata: EventMetadata::default(),
            npc_id,
        }
    }

    pub fn npc_started_leaving(npc_id: NpcId) -> Self {
        DomainEvent::NpcStartedLeaving {
            metadata: EventMetadata::default(),
            npc_id,
        }
    }

    pub fn npc_departed(npc_id: NpcId) -> Self {
        DomainEvent::NpcDeparted {
            metadata: EventMetadata::default(),
            npc_id,
        }
    }

    pub fn player_moved(from: Position, to: Position) -> Self {
        DomainEvent::PlayerMoved {
            metadata: EventMetadata::default(),
            from,
            to,
        }
    }

    pub fn interaction_target_changed(npc_id: Option<NpcId>) -> Self {
        DomainEvent::InteractionTargetChanged {
            metadata: EventMetadata::default(),
            npc_id,
        }
    }

    pub fn experience_gained(amount: u32, total: u32) -> Self {
        DomainEvent::ExperienceGained {
            metadata: EventMetadata::default(),
            amount,
            total,
        }
    }

    pub fn item_received(item_name: impl Into<String>) -> Self {
        DomainEvent::ItemReceived {
            metadata: EventMetadata::default(),
            item_name: item_name.into(),
        }
    }

    pub fn vocabulary_learned(words: Vec<String>) -> Self {
        DomainEvent::VocabularyLearned {
            metadata: EventMetadata::default(),
            words,
        }
    }

    pub fn conversation_started(conversation_id: ConversationId, npc_id: NpcId) -> Self {
        DomainEvent::ConversationStarted {
            metadata: EventMetadata::default(),
            conversation_id,
            npc_id,
        }
    }

    pub fn conversation_ended(conversation_id: ConversationId, npc_id: NpcId) -> Self {
        DomainEvent::ConversationEnded {
            metadata: EventMetadata::default(),
            conversation_id,
            npc_id,
        }
    }

    pub fn mission_completed(mission_id: MissionId) -> Self {
        DomainEvent::MissionCompleted {
            metadata: EventMetadata::default(),
            mission_id,
        }
    }
}

impl std::fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::NpcStartedWandering { npc_id, target, .. } => {
                write!(f, "{} heads for {}", npc_id, target)
            }
            DomainEvent::NpcStepped { npc_id, from, to, .. } => {
                write!(f, "{} stepped {} -> {}", npc_id, from, to)
            }
            DomainEvent::NpcArrived { npc_id, at, .. } => write!(f, "{} arrived at {}", npc_id, at),
            DomainEvent::OrderTaken { npc_id, item_name, .. } => {
                write!(f, "{} ordered a {}", npc_id, item_name)
            }
            DomainEvent::OrderFulfilled { npc_id, item_name, .. } => {
                write!(f, "{} got their {}", npc_id, item_name)
            }
            DomainEvent::OrderAbandoned { npc_id, item_name, .. } => {
                write!(f, "{} gave up waiting for a {}", npc_id, item_name)
            }
            DomainEvent::ConsumptionFinished { npc_id, .. } => {
                write!(f, "{} finished their drink", npc_id)
            }
            DomainEvent::NpcStartedLeaving { npc_id, .. } => write!(f, "{} is leaving", npc_id),
            DomainEvent::NpcDeparted { npc_id, .. } => write!(f, "{} left the cafe", npc_id),
            DomainEvent::PlayerMoved { from, to, .. } => {
                write!(f, "player moved {} -> {}", from, to)
            }
            DomainEvent::InteractionTargetChanged { npc_id, .. } => match npc_id {
                Some(npc_id) => write!(f, "can talk to {}", npc_id),
                None => write!(f, "nobody to talk to"),
            },
            DomainEvent::ExperienceGained { amount, total, .. } => {
                write!(f, "+{} xp ({} total)", amount, total)
            }
            DomainEvent::ItemReceived { item_name, .. } => write!(f, "received a {}", item_name),
            DomainEvent::VocabularyLearned { words, .. } => {
                write!(f, "learned {}", words.join(", "))
            }
            DomainEvent::ConversationStarted {
                conversation_id,
                npc_id,
                ..
            } => write!(f, "conversation {} with {} started", conversation_id, npc_id),
            DomainEvent::ConversationEnded {
                conversation_id,
                npc_id,
                ..
            } => write!(f, "conversation {} with {} ended", conversation_id, npc_id),
            DomainEvent::MissionCompleted { mission_id, .. } => {
                write!(f, "mission {} completed", mission_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_npc() {
        let event = DomainEvent::order_taken(NpcId::from("lily"), "Latte");
        assert_eq!(event.to_string(), "lily ordered a Latte");
        assert_eq!(event.event_type(), "OrderTaken");
        assert!(event.is_notable());

        let step = DomainEvent::npc_stepped(NpcId::from("mia"), Position::new(7, 8), Position::new(7, 7));
        assert_eq!(step.to_string(), "mia stepped (7, 8) -> (7, 7)");
        assert!(!step.is_notable());
    }

    #[test]
    fn test_metadata_is_stamped_at_creation() {
        let before = Utc::now();
        let event = DomainEvent::npc_departed(NpcId::from("ken"));
        assert!(event.metadata().timestamp >= before);
    }
}
