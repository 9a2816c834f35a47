//! Item entity - Drinks, snacks and gifts that change hands

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ItemId;

/// An owned item. Moving it between player and NPC moves the value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub icon: String,
    pub description: String,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            icon: icon.into(),
            description: description.into(),
        }
    }

    /// A freshly prepared serving of a menu entry
    pub fn served(menu_item: &MenuItem) -> Self {
        Self::new(menu_item.name, menu_item.icon, "Served with care.")
    }

    /// Case-insensitive name comparison used for order matching
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

/// A fixed entry on the cafe menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub const MENU: [MenuItem; 5] = [
    MenuItem {
        name: "Espresso",
        icon: "☕",
        description: "Strong and bold.",
    },
    MenuItem {
        name: "Latte",
        icon: "🥛",
        description: "Smooth and creamy.",
    },
    MenuItem {
        name: "Green Tea",
        icon: "🍵",
        description: "Calming and healthy.",
    },
    MenuItem {
        name: "Blueberry Muffin",
        icon: "🧁",
        description: "Freshly baked.",
    },
    MenuItem {
        name: "Croissant",
        icon: "🥐",
        description: "Buttery and flaky.",
    },
];

/// Look up a menu entry by name, ignoring case and surrounding whitespace
pub fn find_menu_item(name: &str) -> Option<&'static MenuItem> {
    let name = name.trim();
    MENU.iter().find(|item| item.name.eq_ignore_ascii_case(name))
}

/// Menu names joined for prompt text
pub fn menu_names() -> Vec<&'static str> {
    MENU.iter().map(|item| item.name).collect()
}
