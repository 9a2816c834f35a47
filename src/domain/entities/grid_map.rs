//! Grid map entity - The immutable tile layout of the cafe

use crate::domain::value_objects::Position;

/// Terrain and furniture kinds, keyed by their map code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Floor,
    Wall,
    Counter,
    TableSquare,
    TableRound,
    SofaLeft,
    SofaRight,
    Chair,
    Plant,
    CoffeeMachine,
    Register,
    Grass,
    PatioTile,
    Umbrella,
    Fence,
    Wc,
    WcSink,
    Door,
    TrashBin,
    Window,
    MenuBoard,
    Scanner,
}

impl TileKind {
    /// Decode a numeric map cell
    pub fn from_code(code: u8) -> Option<Self> {
        let kind = match code {
            0 => TileKind::Floor,
            1 => TileKind::Wall,
            2 => TileKind::Counter,
            3 => TileKind::TableSquare,
            4 => TileKind::TableRound,
            5 => TileKind::SofaLeft,
            6 => TileKind::SofaRight,
            7 => TileKind::Chair,
            8 => TileKind::Plant,
            9 => TileKind::CoffeeMachine,
            10 => TileKind::Register,
            11 => TileKind::Grass,
            12 => TileKind::PatioTile,
            13 => TileKind::Umbrella,
            14 => TileKind::Fence,
            15 => TileKind::Wc,
            16 => TileKind::WcSink,
            17 => TileKind::Door,
            18 => TileKind::TrashBin,
            19 => TileKind::Window,
            20 => TileKind::MenuBoard,
            21 => TileKind::Scanner,
            _ => return None,
        };
        Some(kind)
    }

    /// Walls, counters and fences block movement; everything else is walkable
    pub fn is_obstacle(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Counter | TileKind::Fence)
    }
}

/// Static map data: tile rows plus the wander destinations
#[derive(Debug, Clone)]
pub struct GridWorld {
    tiles: Vec<Vec<TileKind>>,
    width: usize,
    points_of_interest: Vec<Position>,
}

impl GridWorld {
    /// Build a grid from rows of tile codes.
    ///
    /// # Invariants
    /// - The grid has at least one row and every row has the same length
    /// - Every code maps to a known tile kind
    /// - Points of interest lie inside the grid
    pub fn from_codes(rows: &[&[u8]], points_of_interest: Vec<Position>) -> Result<Self, GridError> {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            let mut decoded = Vec::with_capacity(width);
            for (x, code) in row.iter().enumerate() {
                let kind = TileKind::from_code(*code).ok_or(GridError::UnknownTile {
                    code: *code,
                    at: Position::new(x as i32, y as i32),
                })?;
                decoded.push(kind);
            }
            tiles.push(decoded);
        }

        let grid = Self {
            tiles,
            width,
            points_of_interest: Vec::new(),
        };
        if let Some(outside) = points_of_interest.iter().find(|p| !grid.in_bounds(**p)) {
            return Err(GridError::PointOutOfBounds(*outside));
        }

        Ok(Self {
            points_of_interest,
            ..grid
        })
    }

    pub fn points_of_interest(&self) -> &[Position] {
        &self.points_of_interest
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as usize) < self.width
            && (position.y as usize) < self.tiles.len()
    }

    pub fn tile_at(&self, position: Position) -> Option<TileKind> {
        if !self.in_bounds(position) {
            return None;
        }
        Some(self.tiles[position.y as usize][position.x as usize])
    }

    /// A cell is walkable when it is on the grid, not an obstacle, and not
    /// in `occupied`.
    pub fn is_walkable(&self, position: Position, occupied: &[Position]) -> bool {
        match self.tile_at(position) {
            Some(tile) if !tile.is_obstacle() => !occupied.contains(&position),
            _ => false,
        }
    }
}

/// Errors raised while building a grid from seed data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// No rows or zero-width rows
    Empty,
    /// A row differs in length from the first row
    RaggedRow { row: usize, expected: usize, found: usize },
    /// A cell code has no tile kind
    UnknownTile { code: u8, at: Position },
    /// A point of interest lies off the grid
    PointOutOfBounds(Position),
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::Empty => write!(f, "Grid has no cells"),
            GridError::RaggedRow { row, expected, found } => write!(
                f,
                "Grid row {} has {} cells, expected {}",
                row, found, expected
            ),
            GridError::UnknownTile { code, at } => {
                write!(f, "Unknown tile code {} at {}", code, at)
            }
            GridError::PointOutOfBounds(position) => {
                write!(f, "Point of interest {} is outside the grid", position)
            }
        }
    }
}

impl std::error::Error for GridError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> GridWorld {
        // 0 = floor, 1 = wall, 2 = counter, 14 = fence, 8 = plant
        let rows: [&[u8]; 3] = [&[1, 1, 1, 1, 1], &[1, 0, 8, 2, 0], &[1, 0, 14, 0, 0]];
        GridWorld::from_codes(&rows, vec![Position::new(1, 1)]).unwrap()
    }

    #[test]
    fn test_obstacle_classification() {
        assert!(TileKind::Wall.is_obstacle());
        assert!(TileKind::Counter.is_obstacle());
        assert!(TileKind::Fence.is_obstacle());
        assert!(!TileKind::Plant.is_obstacle());
        assert!(!TileKind::Door.is_obstacle());
        assert!(!TileKind::TableRound.is_obstacle());
    }

    #[test]
    fn test_walkability() {
        let grid = small_grid();
        assert!(grid.is_walkable(Position::new(1, 1), &[]));
        assert!(grid.is_walkable(Position::new(2, 1), &[]));
        assert!(!grid.is_walkable(Position::new(0, 0), &[]));
        assert!(!grid.is_walkable(Position::new(3, 1), &[]));
        assert!(!grid.is_walkable(Position::new(2, 2), &[]));
    }

    #[test]
    fn test_walkability_respects_occupancy() {
        let grid = small_grid();
        let occupied = [Position::new(1, 2)];
        assert!(!grid.is_walkable(Position::new(1, 2), &occupied));
        assert!(grid.is_walkable(Position::new(1, 1), &occupied));
    }

    #[test]
    fn test_bounds_use_actual_extents() {
        let grid = small_grid();
        assert!(grid.in_bounds(Position::new(4, 2)));
        assert!(!grid.in_bounds(Position::new(5, 0)));
        assert!(grid.is_walkable(Position::new(4, 2), &[]));
        assert!(!grid.is_walkable(Position::new(5, 2), &[]));
        assert!(!grid.is_walkable(Position::new(4, 3), &[]));
        assert!(!grid.is_walkable(Position::new(-1, 1), &[]));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let rows: [&[u8]; 2] = [&[0, 0, 0], &[0, 0]];
        let err = GridWorld::from_codes(&rows, vec![]).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_rejects_unknown_codes_and_stray_points() {
        let rows: [&[u8]; 1] = [&[0, 99]];
        assert!(matches!(
            GridWorld::from_codes(&rows, vec![]),
            Err(GridError::UnknownTile { code: 99, .. })
        ));

        let rows: [&[u8]; 1] = [&[0, 0]];
        assert!(matches!(
            GridWorld::from_codes(&rows, vec![Position::new(7, 0)]),
            Err(GridError::PointOutOfBounds(_))
        ));
    }
}
