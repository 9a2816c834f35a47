//! Vocabulary entries surfaced by the dialogue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A word the player picked up during a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    pub definition: String,
    pub part_of_speech: String,
    pub example: String,
    pub learned_at: DateTime<Utc>,
}

impl VocabularyEntry {
    pub fn new(
        word: impl Into<String>,
        definition: impl Into<String>,
        part_of_speech: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
            part_of_speech: part_of_speech.into(),
            example: example.into(),
            learned_at: Utc::now(),
        }
    }

    /// Case-insensitive match on the headword
    pub fn is_same_word(&self, other: &str) -> bool {
        self.word.trim().eq_ignore_ascii_case(other.trim())
    }
}
