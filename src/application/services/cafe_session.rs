//! Cafe Session - Orchestrates a single play session
//!
//! Owns the `CafeState` aggregate and is the only place where ticks, player
//! commands and dialogue outcomes meet. Every method is synchronous: callers
//! hold the session lock for the duration of one call and release it before
//! awaiting the dialogue model.

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::application::dto::{ChatTurn, DialogueOutcome, DialogueRequest, Greeting};
use crate::application::services::npc_simulator::NpcSimulator;
use crate::application::services::player_controller::{self, MoveOutcome};
use crate::domain::aggregates::{CafeState, SessionMode};
use crate::domain::entities::{find_menu_item, Item, Npc, OrderError};
use crate::domain::events::DomainEvent;
use crate::domain::services::mission_tracker;
use crate::domain::value_objects::{ConversationId, NpcId, SimulationRules};

/// An open conversation with one NPC
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: ConversationId,
    pub npc_id: NpcId,
    pub history: Vec<ChatTurn>,
}

/// Returned when a conversation opens; `npc` is a snapshot for the greeting
#[derive(Debug, Clone)]
pub struct DialogueOpened {
    pub conversation_id: ConversationId,
    pub npc: Npc,
    pub events: Vec<DomainEvent>,
}

/// Returned when a conversation closes. `npc` is `None` if the NPC already
/// left the cafe.
#[derive(Debug, Clone)]
pub struct ConversationClosed {
    pub conversation_id: ConversationId,
    pub npc: Option<Npc>,
    pub history: Vec<ChatTurn>,
    pub events: Vec<DomainEvent>,
}

/// Result of handing an item to the conversation partner
#[derive(Debug, Clone)]
pub struct GiftOutcome {
    /// Copy of the gifted item, for the dialogue context
    pub item: Item,
    /// False when the NPC declined and the item went back to the player
    pub accepted: bool,
    pub events: Vec<DomainEvent>,
}

/// Errors raised by session commands. State is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CafeError {
    #[error("NPC not found: {0}")]
    NpcNotFound(NpcId),

    #[error("NPC {0} does not order from the menu")]
    NotACustomer(NpcId),

    #[error("Not on the menu: {0}")]
    UnknownMenuItem(String),

    #[error("Invalid order transition: {0}")]
    Order(#[from] OrderError),

    #[error("Player is not exploring")]
    NotExploring,

    #[error("Nobody to talk to")]
    NoInteractionTarget,

    #[error("No conversation is open")]
    NoConversation,

    #[error("Conversation {0} is no longer open")]
    StaleConversation(ConversationId),

    #[error("Item not in inventory: {0}")]
    ItemNotInInventory(String),
}

/// The session orchestrator
#[derive(Debug)]
pub struct CafeSession {
    state: CafeState,
    simulator: NpcSimulator,
    conversation: Option<Conversation>,
}

impl CafeSession {
    pub fn new(state: CafeState, rules: SimulationRules) -> Self {
        Self {
            state,
            simulator: NpcSimulator::new(rules),
            conversation: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &CafeState {
        &self.state
    }

    pub fn rules(&self) -> &SimulationRules {
        self.simulator.rules()
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn player_level(&self) -> u32 {
        self.state.player().level(self.rules().level_xp_step)
    }

    // ========================================================================
    // Ticks
    // ========================================================================

    pub fn wander_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<DomainEvent> {
        self.simulator.advance_wander(&mut self.state, rng)
    }

    /// Run a consumption tick. A conversation whose NPC departed is closed.
    pub fn consumption_tick(&mut self) -> Vec<DomainEvent> {
        let mut events = self.simulator.advance_consumption(&mut self.state);

        let partner_gone = self
            .conversation
            .as_ref()
            .is_some_and(|conversation| self.state.find_npc(&conversation.npc_id).is_none());
        if partner_gone {
            if let Ok(closed) = self.end_conversation() {
                info!(conversation_id = %closed.conversation_id, "Conversation partner left the cafe");
                events.extend(closed.events);
            }
        }
        events
    }

    // ========================================================================
    // Player commands
    // ========================================================================

    pub fn on_move(&mut self, dx: i32, dy: i32) -> MoveOutcome {
        player_controller::move_player(&mut self.state, dx, dy)
    }

    /// Open a conversation with the current interaction target
    #[instrument(skip(self))]
    pub fn on_interact(&mut self) -> Result<DialogueOpened, CafeError> {
        if !self.state.is_exploring() {
            return Err(CafeError::NotExploring);
        }
        if !self.state.interaction_available() {
            return Err(CafeError::NoInteractionTarget);
        }
        let npc = self
            .state
            .active_npc()
            .filter(|npc| !npc.is_leaving())
            .cloned()
            .ok_or(CafeError::NoInteractionTarget)?;

        let conversation_id = ConversationId::new();
        self.state.set_mode(SessionMode::Dialogue { conversation_id });
        self.conversation = Some(Conversation {
            id: conversation_id,
            npc_id: npc.id.clone(),
            history: Vec::new(),
        });
        info!(%conversation_id, npc_id = %npc.id, "Conversation opened");

        Ok(DialogueOpened {
            conversation_id,
            events: vec![DomainEvent::conversation_started(
                conversation_id,
                npc.id.clone(),
            )],
            npc,
        })
    }

    /// Close the open conversation and return to exploring
    pub fn end_conversation(&mut self) -> Result<ConversationClosed, CafeError> {
        let conversation = self.conversation.take().ok_or(CafeError::NoConversation)?;
        self.state.set_mode(SessionMode::Exploring);

        Ok(ConversationClosed {
            conversation_id: conversation.id,
            npc: self.state.find_npc(&conversation.npc_id).cloned(),
            events: vec![DomainEvent::conversation_ended(
                conversation.id,
                conversation.npc_id,
            )],
            history: conversation.history,
        })
    }

    /// Store a conversation summary on an NPC that is still around
    pub fn store_memory(&mut self, npc_id: &NpcId, memory: String) -> Result<(), CafeError> {
        let npc = self
            .state
            .find_npc_mut(npc_id)
            .ok_or_else(|| CafeError::NpcNotFound(npc_id.clone()))?;
        npc.memory = memory;
        Ok(())
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// A customer ordered `item_name` from the menu.
    ///
    /// The name is matched against the menu ignoring case and stored in its
    /// canonical spelling. Re-ordering while already waiting replaces the order.
    #[instrument(skip(self))]
    pub fn on_order_taken(
        &mut self,
        npc_id: &NpcId,
        item_name: &str,
    ) -> Result<Vec<DomainEvent>, CafeError> {
        let menu_item = find_menu_item(item_name)
            .ok_or_else(|| CafeError::UnknownMenuItem(item_name.to_string()))?;
        let npc = self
            .state
            .find_npc_mut(npc_id)
            .ok_or_else(|| CafeError::NpcNotFound(npc_id.clone()))?;
        if !npc.variant.is_customer() {
            return Err(CafeError::NotACustomer(npc_id.clone()));
        }
        npc.place_order(menu_item.name)?;
        info!(npc_id = %npc_id, item = menu_item.name, "Order taken");

        let mut events = vec![DomainEvent::order_taken(npc_id.clone(), menu_item.name)];
        let awaiting = self.state.awaiting_order_count();
        events.extend(
            mission_tracker::on_order_taken(self.state.missions_mut(), awaiting)
                .into_iter()
                .map(DomainEvent::mission_completed),
        );
        Ok(events)
    }

    /// Serve a freshly made `item_name` to a waiting customer
    #[instrument(skip(self))]
    pub fn on_order_fulfilled(
        &mut self,
        npc_id: &NpcId,
        item_name: &str,
    ) -> Result<Vec<DomainEvent>, CafeError> {
        let menu_item = find_menu_item(item_name)
            .ok_or_else(|| CafeError::UnknownMenuItem(item_name.to_string()))?;
        if self.state.find_npc(npc_id).is_none() {
            return Err(CafeError::NpcNotFound(npc_id.clone()));
        }
        Ok(self.deliver(npc_id, Item::served(menu_item))?)
    }

    /// Hand an inventory item to the conversation partner.
    ///
    /// A match against the pending order makes the item the NPC's beverage.
    /// Anything else is declined and stays with the player.
    #[instrument(skip(self))]
    pub fn give_item(&mut self, item_name: &str) -> Result<GiftOutcome, CafeError> {
        let npc_id = self
            .conversation
            .as_ref()
            .map(|conversation| conversation.npc_id.clone())
            .ok_or(CafeError::NoConversation)?;
        if self.state.find_npc(&npc_id).is_none() {
            return Err(CafeError::NpcNotFound(npc_id));
        }

        let item_id = self
            .state
            .player()
            .find_item_by_name(item_name)
            .map(|item| item.id)
            .ok_or_else(|| CafeError::ItemNotInInventory(item_name.to_string()))?;
        let item = self
            .state
            .player_mut()
            .take_item(&item_id)
            .ok_or_else(|| CafeError::ItemNotInInventory(item_name.to_string()))?;
        let gift = item.clone();

        match self.deliver(&npc_id, item) {
            Ok(events) => Ok(GiftOutcome {
                item: gift,
                accepted: true,
                events,
            }),
            Err(e) => {
                debug!(npc_id = %npc_id, error = %e, "Gift declined");
                if let Some(returned) = e.into_offered() {
                    self.state.player_mut().receive_item(returned);
                }
                Ok(GiftOutcome {
                    item: gift,
                    accepted: false,
                    events: Vec::new(),
                })
            }
        }
    }

    fn deliver(&mut self, npc_id: &NpcId, item: Item) -> Result<Vec<DomainEvent>, OrderError> {
        let rules = self.simulator.rules().clone();
        let Some(npc) = self.state.find_npc_mut(npc_id) else {
            return Err(OrderError::NotWaiting { offered: item });
        };

        let item_name = item.name.clone();
        npc.serve(item, rules.consumption_ticks)?;
        info!(npc_id = %npc_id, item = %item_name, "Order fulfilled");

        let total = self.state.player_mut().add_xp(rules.serve_xp_reward);
        let mut events = vec![
            DomainEvent::order_fulfilled(npc_id.clone(), item_name),
            DomainEvent::experience_gained(rules.serve_xp_reward, total),
        ];
        events.extend(
            mission_tracker::on_order_fulfilled(self.state.missions_mut())
                .into_iter()
                .map(DomainEvent::mission_completed),
        );
        Ok(events)
    }

    // ========================================================================
    // Dialogue
    // ========================================================================

    /// Add the opening line to the conversation log
    pub fn record_greeting(
        &mut self,
        conversation_id: ConversationId,
        greeting: &Greeting,
    ) -> Result<(), CafeError> {
        let conversation = self.open_conversation_mut(conversation_id)?;
        conversation.history.push(ChatTurn::npc(greeting.text.clone()));
        Ok(())
    }

    /// Record the player's line and build the request for the dialogue model
    pub fn begin_turn(
        &mut self,
        utterance: &str,
        gifted_item: Option<Item>,
    ) -> Result<DialogueRequest, CafeError> {
        let conversation = self.conversation.as_mut().ok_or(CafeError::NoConversation)?;
        let npc = self
            .state
            .find_npc(&conversation.npc_id)
            .cloned()
            .ok_or_else(|| CafeError::NpcNotFound(conversation.npc_id.clone()))?;

        let history = conversation.history.clone();
        let mut turn = ChatTurn::player(utterance);
        if let Some(item) = &gifted_item {
            turn = turn.with_gift(item.name.clone());
        }
        conversation.history.push(turn);

        Ok(DialogueRequest {
            conversation_id: conversation.id,
            npc,
            history,
            utterance: utterance.to_string(),
            gifted_item,
        })
    }

    /// Apply a dialogue reply to the session.
    ///
    /// Replies for a conversation that is no longer open are rejected with
    /// `StaleConversation` and change nothing.
    #[instrument(skip(self, outcome), fields(conversation_id = %outcome.conversation_id))]
    pub fn apply_reply(&mut self, outcome: DialogueOutcome) -> Result<Vec<DomainEvent>, CafeError> {
        let reply = outcome.reply;
        let conversation = self.open_conversation_mut(outcome.conversation_id)?;
        let npc_id = conversation.npc_id.clone();
        conversation.history.push(
            ChatTurn::npc(reply.text.clone()).with_feedback(reply.feedback.clone(), reply.fluency_score),
        );

        let mut events = Vec::new();
        let player = self.state.player_mut();
        if reply.fluency_score > 0 {
            let amount = u32::from(reply.fluency_score);
            let total = player.add_xp(amount);
            events.push(DomainEvent::experience_gained(amount, total));
        }

        let learned = player.learn_vocabulary(reply.vocabulary);
        if !learned.is_empty() {
            events.push(DomainEvent::vocabulary_learned(learned));
        }

        if let Some(item) = reply.reward_item {
            events.push(DomainEvent::item_received(item.name.clone()));
            player.receive_item(item);
        }

        let Some(npc) = self.state.find_npc(&npc_id).cloned() else {
            return Ok(events);
        };

        if let Some(item_name) = reply.ordered_item_name.as_deref() {
            if npc.variant.is_customer() {
                match self.on_order_taken(&npc_id, item_name) {
                    Ok(order_events) => events.extend(order_events),
                    Err(e) => warn!(npc_id = %npc_id, error = %e, "Ignoring order from dialogue"),
                }
            }
        }

        events.extend(
            mission_tracker::on_object_visit(
                self.state.missions_mut(),
                &npc,
                &outcome.utterance,
                reply.mission_completed,
            )
            .into_iter()
            .map(DomainEvent::mission_completed),
        );
        Ok(events)
    }

    fn open_conversation_mut(
        &mut self,
        conversation_id: ConversationId,
    ) -> Result<&mut Conversation, CafeError> {
        self.conversation
            .as_mut()
            .filter(|conversation| conversation.id == conversation_id)
            .ok_or(CafeError::StaleConversation(conversation_id))
    }
}
