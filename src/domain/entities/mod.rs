//! Domain entities - Core business objects with identity

mod grid_map;
mod item;
mod mission;
mod npc;
mod player;

pub use grid_map::GridWorld;
pub use item::{find_menu_item, menu_names, Item};
pub use mission::{Mission, MissionObjective};
pub use npc::{MovementState, Npc, NpcVariant, OrderError, OrderState};
pub use player::Player;
