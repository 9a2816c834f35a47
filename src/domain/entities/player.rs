//! Player entity - The cafe owner controlled by the user

use serde::{Deserialize, Serialize};

use crate::domain::entities::Item;
use crate::domain::value_objects::{Facing, ItemId, Position, VocabularyEntry};

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Position,
    pub facing: Facing,
    xp: u32,
    pub inventory: Vec<Item>,
    pub vocabulary: Vec<VocabularyEntry>,
}

impl Player {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            facing: Facing::default(),
            xp: 0,
            inventory: Vec::new(),
            vocabulary: Vec::new(),
        }
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// Experience only ever grows
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        self.xp
    }

    /// Level reached at `level_xp_step` experience per level. The step
    /// must be positive.
    pub fn level(&self, level_xp_step: u32) -> u32 {
        self.xp / level_xp_step + 1
    }

    pub fn receive_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    /// Remove an item from the inventory, transferring ownership to the caller
    pub fn take_item(&mut self, item_id: &ItemId) -> Option<Item> {
        let index = self.inventory.iter().position(|item| &item.id == item_id)?;
        Some(self.inventory.remove(index))
    }

    pub fn find_item_by_name(&self, name: &str) -> Option<&Item> {
        self.inventory.iter().find(|item| item.matches_name(name))
    }

    /// Add words not already learned. Returns the newly learned words.
    pub fn learn_vocabulary(&mut self, entries: Vec<VocabularyEntry>) -> Vec<String> {
        let mut learned = Vec::new();
        for entry in entries {
            if entry.word.trim().is_empty() {
                continue;
            }
            if self.vocabulary.iter().any(|known| known.is_same_word(&entry.word)) {
                continue;
            }
            learned.push(entry.word.clone());
            self.vocabulary.push(entry);
        }
        learned
    }
}
