//! Grid coordinates and facing direction

use serde::{Deserialize, Serialize};

/// An integer cell on the cafe grid. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Orthogonal neighbour offsets in scan order: up, down, left, right
const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four orthogonal neighbours, always in up/down/left/right order
    pub fn neighbors(self) -> [Position; 4] {
        ORTHOGONAL_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// Straight-line distance between two cells
    pub fn distance_to(self, other: Position) -> f64 {
        f64::from(self.x - other.x).hypot(f64::from(self.y - other.y))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which way the player sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing after a horizontal move; `None` when `dx` is zero
    pub fn from_dx(dx: i32) -> Option<Self> {
        match dx.signum() {
            1 => Some(Facing::Right),
            -1 => Some(Facing::Left),
            _ => None,
        }
    }
}
