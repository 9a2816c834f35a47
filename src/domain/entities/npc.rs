//! NPC entity - Customers, staff and interactable objects in the cafe

use serde::{Deserialize, Serialize};

use crate::domain::entities::Item;
use crate::domain::value_objects::{MissionId, NpcId, Position};

/// Visual/behavioural family of an NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpcVariant {
    Barista,
    Staff,
    Security,
    Shopkeeper,
    Traveler,
    Nomad,
    Student,
    /// A talking prop such as the trash bin
    Object,
}

impl NpcVariant {
    /// Whether this NPC orders from the menu
    pub fn is_customer(&self) -> bool {
        match self {
            NpcVariant::Traveler | NpcVariant::Nomad | NpcVariant::Student => true,
            NpcVariant::Barista
            | NpcVariant::Staff
            | NpcVariant::Security
            | NpcVariant::Shopkeeper
            | NpcVariant::Object => false,
        }
    }
}

/// Wander axis of the NPC state machine. The target only exists while moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    Moving { target: Position },
}

/// Order/consumption axis of the NPC state machine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum OrderState {
    #[default]
    None,
    AwaitingOrder {
        item_name: String,
        /// Consumption ticks spent waiting so far
        waited_ticks: u32,
    },
    Consuming {
        beverage: Item,
        remaining_ticks: u32,
    },
    Leaving {
        remaining_ticks: u32,
    },
}

/// A non-player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub role: String,
    pub avatar: String,
    pub variant: NpcVariant,
    pub position: Position,
    pub personality: String,
    /// Opening line used when the dialogue model cannot produce a greeting
    pub initial_message: Option<String>,
    /// Mission completed by talking to this NPC
    pub mission_id: Option<MissionId>,
    /// Keyword that completes `mission_id` when the player says it here
    pub mission_trigger: Option<String>,
    pub is_stationary: bool,
    pub is_permanent: bool,
    pub movement: MovementState,
    pub order: OrderState,
    pub idle_timer: u32,
    /// Conversation summary written by the dialogue subsystem
    pub memory: String,
}

impl Npc {
    pub fn new(
        id: impl Into<NpcId>,
        name: impl Into<String>,
        role: impl Into<String>,
        variant: NpcVariant,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            avatar: String::new(),
            variant,
            position,
            personality: String::new(),
            initial_message: None,
            mission_id: None,
            mission_trigger: None,
            is_stationary: false,
            is_permanent: false,
            movement: MovementState::Idle,
            order: OrderState::None,
            idle_timer: 0,
            memory: String::new(),
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_initial_message(mut self, message: impl Into<String>) -> Self {
        self.initial_message = Some(message.into());
        self
    }

    pub fn with_mission(mut self, mission_id: MissionId, trigger: impl Into<String>) -> Self {
        self.mission_id = Some(mission_id);
        self.mission_trigger = Some(trigger.into());
        self
    }

    pub fn with_idle_timer(mut self, ticks: u32) -> Self {
        self.idle_timer = ticks;
        self
    }

    pub fn stationary(mut self) -> Self {
        self.is_stationary = true;
        self.movement = MovementState::Idle;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.is_permanent = true;
        self
    }

    pub fn pending_order(&self) -> Option<&str> {
        match &self.order {
            OrderState::AwaitingOrder { item_name, .. } => Some(item_name),
            _ => None,
        }
    }

    pub fn beverage(&self) -> Option<&Item> {
        match &self.order {
            OrderState::Consuming { beverage, .. } => Some(beverage),
            _ => None,
        }
    }

    pub fn is_leaving(&self) -> bool {
        matches!(self.order, OrderState::Leaving { .. })
    }

    pub fn target(&self) -> Option<Position> {
        match self.movement {
            MovementState::Moving { target } => Some(target),
            MovementState::Idle => None,
        }
    }

    /// Record a menu order. Re-ordering while already waiting replaces the item.
    pub fn place_order(&mut self, item_name: impl Into<String>) -> Result<(), OrderError> {
        match self.order {
            OrderState::None | OrderState::AwaitingOrder { .. } => {
                self.order = OrderState::AwaitingOrder {
                    item_name: item_name.into(),
                    waited_ticks: 0,
                };
                self.movement = MovementState::Idle;
                Ok(())
            }
            OrderState::Consuming { .. } | OrderState::Leaving { .. } => Err(OrderError::Busy),
        }
    }

    /// Hand over an item for the pending order. On a mismatch the item is
    /// returned inside the error.
    pub fn serve(&mut self, item: Item, consumption_ticks: u32) -> Result<(), OrderError> {
        let expected = match &self.order {
            OrderState::AwaitingOrder { item_name, .. } => item_name.clone(),
            _ => return Err(OrderError::NotWaiting { offered: item }),
        };
        if !item.matches_name(&expected) {
            return Err(OrderError::Mismatch {
                expected,
                offered: item,
            });
        }
        self.order = OrderState::Consuming {
            beverage: item,
            remaining_ticks: consumption_ticks,
        };
        Ok(())
    }

    /// Drop any drink or order and head for the exit
    pub fn start_leaving(&mut self, leaving_ticks: u32) {
        self.order = OrderState::Leaving {
            remaining_ticks: leaving_ticks,
        };
        self.movement = MovementState::Idle;
    }

    /// End the current drink or order: permanent NPCs become available
    /// again, everyone else starts leaving.
    pub fn settle(&mut self, leaving_ticks: u32) {
        if self.is_permanent {
            self.order = OrderState::None;
        } else {
            self.start_leaving(leaving_ticks);
        }
    }
}

/// Rejected order transitions
#[derive(Debug, Clone, PartialEq)]
pub enum OrderError {
    /// The NPC is drinking or leaving and cannot order
    Busy,
    /// The NPC has no pending order
    NotWaiting { offered: Item },
    /// The offered item is not what the NPC ordered
    Mismatch { expected: String, offered: Item },
}

impl OrderError {
    /// Take back the item from a failed delivery
    pub fn into_offered(self) -> Option<Item> {
        match self {
            OrderError::Busy => None,
            OrderError::NotWaiting { offered } | OrderError::Mismatch { offered, .. } => {
                Some(offered)
            }
        }
    }
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderError::Busy => write!(f, "NPC is busy and cannot order"),
            OrderError::NotWaiting { offered } => {
                write!(f, "NPC is not waiting for an order (offered {})", offered.name)
            }
            OrderError::Mismatch { expected, offered } => write!(
                f,
                "NPC ordered {} but was offered {}",
                expected, offered.name
            ),
        }
    }
}

impl std::error::Error for OrderError {}
