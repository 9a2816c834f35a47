//! Cafe State - The root aggregate for one play session
//!
//! Holds the grid, the NPC roster, missions and the player. All session
//! mutations go through this aggregate so that occupancy and interaction
//! invariants are checked in one place.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::entities::{GridWorld, Mission, Npc, Player};
use crate::domain::value_objects::{ConversationId, NpcId, Position};

/// What the player is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Free roam: movement commands are accepted
    #[default]
    Exploring,
    /// Talking to an NPC; movement is ignored until the conversation closes
    Dialogue { conversation_id: ConversationId },
}

/// The Cafe State Aggregate Root
#[derive(Debug, Clone)]
pub struct CafeState {
    grid: Arc<GridWorld>,
    npcs: Vec<Npc>,
    missions: Vec<Mission>,
    player: Player,
    mode: SessionMode,
    /// NPC next to the player, also the dialogue partner while talking
    active_npc: Option<NpcId>,
    interaction_available: bool,
}

impl CafeState {
    /// Assemble a session from seed data.
    ///
    /// # Invariants
    /// - NPC ids are unique
    /// - The player and every wandering NPC stand on walkable tiles
    /// - Stationary NPCs stand anywhere on the map (Ben works behind the counter)
    /// - No two NPCs share a cell and none stands on the player
    pub fn new(
        grid: Arc<GridWorld>,
        npcs: Vec<Npc>,
        missions: Vec<Mission>,
        player: Player,
    ) -> Result<Self, AggregateError> {
        if !grid.is_walkable(player.position, &[]) {
            return Err(AggregateError::ValidationError(format!(
                "Player starts on blocked cell {}",
                player.position
            )));
        }

        let mut ids = HashSet::new();
        let mut cells = HashSet::from([player.position]);
        for npc in &npcs {
            if !ids.insert(npc.id.clone()) {
                return Err(AggregateError::ValidationError(format!(
                    "Duplicate NPC id {}",
                    npc.id
                )));
            }
            let placeable = if npc.is_stationary {
                grid.in_bounds(npc.position)
            } else {
                grid.is_walkable(npc.position, &[])
            };
            if !placeable {
                return Err(AggregateError::ValidationError(format!(
                    "NPC {} starts on blocked cell {}",
                    npc.id, npc.position
                )));
            }
            if !cells.insert(npc.position) {
                return Err(AggregateError::ValidationError(format!(
                    "NPC {} starts on occupied cell {}",
                    npc.id, npc.position
                )));
            }
        }

        let mut mission_ids = HashSet::new();
        for mission in &missions {
            if !mission_ids.insert(mission.id.clone()) {
                return Err(AggregateError::ValidationError(format!(
                    "Duplicate mission id {}",
                    mission.id
                )));
            }
        }

        Ok(Self {
            grid,
            npcs,
            missions,
            player,
            mode: SessionMode::Exploring,
            active_npc: None,
            interaction_available: false,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn is_exploring(&self) -> bool {
        self.mode == SessionMode::Exploring
    }

    pub fn active_npc_id(&self) -> Option<&NpcId> {
        self.active_npc.as_ref()
    }

    pub fn interaction_available(&self) -> bool {
        self.interaction_available
    }

    /// Cells currently held by NPCs
    pub fn occupied_cells(&self) -> Vec<Position> {
        self.npcs.iter().map(|npc| npc.position).collect()
    }

    /// Number of NPCs with a pending order
    pub fn awaiting_order_count(&self) -> usize {
        self.npcs
            .iter()
            .filter(|npc| npc.pending_order().is_some())
            .count()
    }

    // ========================================================================
    // Finders
    // ========================================================================

    pub fn find_npc(&self, id: &NpcId) -> Option<&Npc> {
        self.npcs.iter().find(|n| &n.id == id)
    }

    /// The NPC the player may talk to (or is talking to)
    pub fn active_npc(&self) -> Option<&Npc> {
        self.active_npc.as_ref().and_then(|id| self.find_npc(id))
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    pub fn find_npc_mut(&mut self, id: &NpcId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|n| &n.id == id)
    }

    pub fn missions_mut(&mut self) -> &mut [Mission] {
        &mut self.missions
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Install the NPC set computed by a tick. NPCs missing from `npcs` are
    /// gone for good; a departed interaction target is cleared.
    pub fn replace_npcs(&mut self, npcs: Vec<Npc>) {
        self.npcs = npcs;
        if let Some(id) = &self.active_npc {
            if self.find_npc(id).is_none() {
                self.active_npc = None;
                self.interaction_available = false;
            }
        }
    }

    /// Set or clear the interaction target together with its flag
    pub fn set_interaction_target(&mut self, npc_id: Option<NpcId>) {
        self.interaction_available = npc_id.is_some();
        self.active_npc = npc_id;
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        self.mode = mode;
    }
}

/// Errors that can occur when assembling the aggregate
#[derive(Debug, Clone)]
pub enum AggregateError {
    /// A validation rule was violated
    ValidationError(String),
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NpcVariant;

    fn grid() -> Arc<GridWorld> {
        let rows: [&[u8]; 3] = [&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]];
        Arc::new(GridWorld::from_codes(&rows, vec![Position::new(2, 2)]).unwrap())
    }

    fn npc(id: &str, x: i32, y: i32) -> Npc {
        Npc::new(id, id, "Customer", NpcVariant::Traveler, Position::new(x, y))
    }

    #[test]
    fn test_rejects_overlapping_seed() {
        let err = CafeState::new(
            grid(),
            vec![npc("a", 0, 1), npc("b", 0, 1)],
            vec![],
            Player::new(Position::new(0, 0)),
        );
        assert!(err.is_err());

        let err = CafeState::new(
            grid(),
            vec![npc("a", 0, 0)],
            vec![],
            Player::new(Position::new(0, 0)),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_blocked_and_duplicate_seed() {
        let blocked = CafeState::new(
            grid(),
            vec![npc("a", 1, 1)],
            vec![],
            Player::new(Position::new(0, 0)),
        );
        assert!(blocked.is_err());

        let behind_counter = CafeState::new(
            grid(),
            vec![npc("a", 1, 1).stationary()],
            vec![],
            Player::new(Position::new(0, 0)),
        );
        assert!(behind_counter.is_ok());

        let off_map = CafeState::new(
            grid(),
            vec![npc("a", 9, 9).stationary()],
            vec![],
            Player::new(Position::new(0, 0)),
        );
        assert!(off_map.is_err());

        let duplicate = CafeState::new(
            grid(),
            vec![npc("a", 0, 1), npc("a", 2, 1)],
            vec![],
            Player::new(Position::new(0, 0)),
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_replace_npcs_clears_departed_target() {
        let mut state = CafeState::new(
            grid(),
            vec![npc("a", 0, 1), npc("b", 2, 2)],
            vec![],
            Player::new(Position::new(0, 0)),
        )
        .unwrap();
        state.set_interaction_target(Some(NpcId::from("a")));
        assert!(state.interaction_available());

        state.replace_npcs(vec![npc("b", 2, 2)]);
        assert!(state.active_npc_id().is_none());
        assert!(!state.interaction_available());
        assert_eq!(state.occupied_cells(), vec![Position::new(2, 2)]);
    }
}
