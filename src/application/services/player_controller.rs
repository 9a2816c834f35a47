//! Player Controller - Validates and applies player movement

use crate::domain::aggregates::CafeState;
use crate::domain::events::DomainEvent;
use crate::domain::services::resolve_target;
use crate::domain::value_objects::Facing;

/// Result of a move command
#[derive(Debug, Clone, Default)]
pub struct MoveOutcome {
    /// Whether the player actually changed cells
    pub moved: bool,
    pub events: Vec<DomainEvent>,
}

impl MoveOutcome {
    fn rejected() -> Self {
        Self::default()
    }
}

/// Move the player one cell.
///
/// Rejected without any state change when not exploring, when the delta is
/// not a single orthogonal step, or when the destination is blocked by a
/// tile or an NPC. An accepted move updates facing on horizontal steps and
/// recomputes the interaction target.
pub fn move_player(state: &mut CafeState, dx: i32, dy: i32) -> MoveOutcome {
    if !state.is_exploring() || dx.abs() + dy.abs() != 1 {
        return MoveOutcome::rejected();
    }

    let from = state.player().position;
    let to = from.offset(dx, dy);
    if !state.grid().is_walkable(to, &state.occupied_cells()) {
        return MoveOutcome::rejected();
    }

    let player = state.player_mut();
    player.position = to;
    if let Some(facing) = Facing::from_dx(dx) {
        player.facing = facing;
    }

    let mut events = vec![DomainEvent::player_moved(from, to)];
    events.extend(refresh_interaction(state));
    MoveOutcome {
        moved: true,
        events,
    }
}

/// Recompute the interaction target from the player's position. Emits an
/// event only when the target changes.
pub fn refresh_interaction(state: &mut CafeState) -> Option<DomainEvent> {
    let target = resolve_target(state.player().position, state.npcs()).map(|npc| npc.id.clone());
    if target.as_ref() == state.active_npc_id() {
        return None;
    }
    state.set_interaction_target(target.clone());
    Some(DomainEvent::interaction_target_changed(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::aggregates::SessionMode;
    use crate::domain::entities::{GridWorld, Npc, NpcVariant, Player};
    use crate::domain::value_objects::{ConversationId, NpcId, Position};

    fn state() -> CafeState {
        // Wall at (1, 0), NPC at (3, 1)
        let rows: [&[u8]; 3] = [&[0, 1, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]];
        let grid = Arc::new(GridWorld::from_codes(&rows, vec![]).unwrap());
        let lily = Npc::new("lily", "Lily", "Student", NpcVariant::Student, Position::new(3, 1));
        CafeState::new(grid, vec![lily], vec![], Player::new(Position::new(1, 1))).unwrap()
    }

    #[test]
    fn test_rejects_obstacles_and_edges() {
        let mut state = state();
        assert!(!move_player(&mut state, 0, -1).moved);
        assert_eq!(state.player().position, Position::new(1, 1));

        move_player(&mut state, -1, 0);
        assert!(!move_player(&mut state, -1, 0).moved);
        assert_eq!(state.player().position, Position::new(0, 1));
    }

    #[test]
    fn test_rejects_npc_cells_and_multi_steps() {
        let mut state = state();
        move_player(&mut state, 1, 0);
        assert!(!move_player(&mut state, 1, 0).moved);
        assert_eq!(state.player().position, Position::new(2, 1));

        assert!(!move_player(&mut state, 1, 1).moved);
        assert!(!move_player(&mut state, 0, 0).moved);
        assert!(!move_player(&mut state, 0, 2).moved);
    }

    #[test]
    fn test_facing_follows_horizontal_moves() {
        let mut state = state();
        move_player(&mut state, -1, 0);
        assert_eq!(state.player().facing, Facing::Left);
        move_player(&mut state, 0, 1);
        assert_eq!(state.player().facing, Facing::Left);
        move_player(&mut state, 1, 0);
        assert_eq!(state.player().facing, Facing::Right);
    }

    #[test]
    fn test_move_updates_interaction_target() {
        let mut state = state();
        let outcome = move_player(&mut state, 1, 0);
        assert!(outcome.moved);
        assert_eq!(outcome.events.len(), 2);
        assert!(state.interaction_available());
        assert_eq!(state.active_npc_id(), Some(&NpcId::from("lily")));

        let outcome = move_player(&mut state, 0, 1);
        assert!(outcome.moved);
        assert!(!state.interaction_available());
        assert!(state.active_npc_id().is_none());
    }

    #[test]
    fn test_no_movement_during_dialogue() {
        let mut state = state();
        state.set_mode(SessionMode::Dialogue {
            conversation_id: ConversationId::new(),
        });
        assert!(!move_player(&mut state, 0, 1).moved);
        assert_eq!(state.player().position, Position::new(1, 1));
    }
}
