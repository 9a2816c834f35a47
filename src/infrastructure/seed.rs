//! Static seed data: the cafe floor plan, the staff and customer roster,
//! and the mission list.

use std::sync::Arc;

use anyhow::Context;

use crate::domain::aggregates::CafeState;
use crate::domain::entities::{GridWorld, Mission, MissionObjective, Npc, NpcVariant, Player};
use crate::domain::value_objects::{MissionId, Position, SimulationRules};

/// Tile codes, row by row. See `TileKind::from_code` for the legend.
pub const GAME_MAP: [[u8; 16]; 12] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 11, 11, 11, 11, 11, 11],
    [1, 8, 19, 19, 1, 0, 0, 0, 8, 1, 11, 11, 11, 11, 11, 11],
    [1, 0, 0, 0, 1, 2, 9, 2, 10, 2, 14, 14, 14, 14, 14, 11],
    [1, 16, 0, 0, 1, 0, 0, 0, 0, 0, 14, 12, 12, 12, 14, 11],
    [1, 15, 0, 0, 1, 0, 0, 0, 0, 17, 12, 4, 13, 4, 14, 11],
    [1, 1, 17, 1, 1, 0, 3, 0, 0, 19, 12, 12, 12, 12, 14, 11],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 19, 12, 4, 12, 4, 14, 11],
    [1, 5, 3, 6, 0, 0, 3, 0, 0, 1, 14, 14, 12, 14, 14, 11],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 11, 14, 12, 14, 11, 11],
    [1, 5, 3, 6, 0, 0, 0, 0, 0, 1, 11, 14, 12, 14, 11, 11],
    [1, 0, 0, 0, 0, 0, 0, 0, 18, 1, 11, 14, 12, 14, 11, 11],
    [1, 1, 1, 1, 1, 17, 17, 1, 1, 1, 11, 11, 11, 11, 11, 11],
];

/// Cells wandering NPCs head for
pub const POINTS_OF_INTEREST: [(i32, i32); 8] = [
    (5, 3),
    (9, 3),
    (2, 6),
    (7, 8),
    (12, 6),
    (12, 10),
    (6, 5),
    (8, 10),
];

pub const PLAYER_START: (i32, i32) = (5, 4);

pub const TRASH_MISSION: &str = "m3";

/// Build the opening state of the cafe
pub fn build_cafe_state(rules: &SimulationRules) -> anyhow::Result<CafeState> {
    let rows: Vec<&[u8]> = GAME_MAP.iter().map(|row| row.as_slice()).collect();
    let points = POINTS_OF_INTEREST
        .iter()
        .map(|&(x, y)| Position::new(x, y))
        .collect();
    let grid = GridWorld::from_codes(&rows, points).context("Invalid cafe floor plan")?;

    let player = Player::new(Position::new(PLAYER_START.0, PLAYER_START.1));
    let state = CafeState::new(Arc::new(grid), roster(), missions(rules), player)
        .context("Invalid cafe roster")?;

    tracing::info!(
        npcs = state.npcs().len(),
        missions = state.missions().len(),
        "Cafe seeded"
    );
    Ok(state)
}

fn roster() -> Vec<Npc> {
    vec![
        Npc::new("barista", "Ben", "Head Barista", NpcVariant::Barista, Position::new(5, 2))
            .with_avatar("👨‍🍳")
            .with_personality(
                "Professional and efficient. He makes whatever the owner requests for the customers.",
            )
            .with_initial_message("Ready to brew! Tell me what the customers ordered.")
            .stationary()
            .permanent(),
        Npc::new("jack", "Jack", "Regular Customer", NpcVariant::Nomad, Position::new(2, 7))
            .with_avatar("💻")
            .with_personality("Honest regular. Always needs a strong drink to stay focused.")
            .with_initial_message("Glad you're here, I was just about to look for some caffeine.")
            .stationary()
            .permanent(),
        Npc::new("lily", "Lily", "Student", NpcVariant::Student, Position::new(6, 5))
            .with_avatar("📚")
            .with_personality("Stressed student. Needs sugar or tea to keep studying.")
            .with_initial_message("Oh, hi. I really need something to help me stay awake.")
            .stationary(),
        Npc::new("mia", "Mia", "Student", NpcVariant::Student, Position::new(7, 8))
            .with_avatar("🎧")
            .with_personality("Social butterfly. Loves fancy drinks.")
            .with_idle_timer(2),
        Npc::new("ken", "Ken", "Tourist", NpcVariant::Traveler, Position::new(12, 6))
            .with_avatar("📸")
            .with_personality("A curious traveler trying local specialties.")
            .with_idle_timer(5),
        Npc::new("trash_bin", "Bin", "Object", NpcVariant::Object, Position::new(8, 10))
            .with_avatar("🗑️")
            .with_personality("Recycling center.")
            .with_initial_message("Maintained by the Owner.")
            .with_mission(MissionId::from(TRASH_MISSION), "trash")
            .stationary()
            .permanent(),
    ]
}

fn missions(rules: &SimulationRules) -> Vec<Mission> {
    vec![
        Mission::new(
            "m1",
            "Morning Rush",
            "Take orders from 3 different customers in the shop.",
            MissionObjective::TakeOrders {
                count: rules.order_mission_threshold,
            },
        ),
        Mission::new(
            "m2",
            "Fulfillment Expert",
            "Serve the correct drinks to waiting customers.",
            MissionObjective::ServeOrder,
        ),
        Mission::new(
            TRASH_MISSION,
            "Clean Environment",
            "Check the trash area to ensure everything is tidy.",
            MissionObjective::VisitObject,
        )
        .with_required_npc("trash_bin"),
    ]
}
