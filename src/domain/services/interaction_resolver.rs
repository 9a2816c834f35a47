//! Interaction resolver - Picks the NPC the player can talk to

use crate::domain::entities::Npc;
use crate::domain::value_objects::Position;

/// Find the interaction target next to `player`.
///
/// Neighbours are scanned up, down, left, right and the first NPC standing
/// on one of them wins, unless it is on its way out.
pub fn resolve_target(player: Position, npcs: &[Npc]) -> Option<&Npc> {
    player.neighbors().into_iter().find_map(|cell| {
        npcs.iter().find(|npc| npc.position == cell && !npc.is_leaving())
    })
}
