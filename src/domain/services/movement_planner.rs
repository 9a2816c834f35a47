//! Movement planner - Greedy single-step movement toward a target
//!
//! There is no search: each call looks at the four orthogonal neighbours and
//! takes the first one that gets strictly closer. An NPC boxed in behind an
//! obstacle stays put until its surroundings change.

use crate::domain::entities::GridWorld;
use crate::domain::value_objects::Position;

/// Compute the next cell on the way from `start` to `target`.
///
/// Returns `start` itself when already there or when no walkable neighbour
/// improves on the current Euclidean distance. Neighbours are tried in
/// up, down, left, right order and a later candidate only wins when it is
/// strictly closer, so the order settles ties.
pub fn next_step(
    grid: &GridWorld,
    start: Position,
    target: Position,
    occupied: &[Position],
) -> Position {
    if start == target {
        return start;
    }

    let mut best = start;
    let mut best_distance = start.distance_to(target);
    for candidate in start.neighbors() {
        if !grid.is_walkable(candidate, occupied) {
            continue;
        }
        let distance = candidate.distance_to(target);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}
