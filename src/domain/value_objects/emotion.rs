//! NPC emotion tags reported by the dialogue model

use serde::{Deserialize, Serialize};

/// The closed set of emotions an NPC portrait can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    #[default]
    Neutral,
    Thinking,
}

impl Emotion {
    /// Parse a model-supplied tag. Anything outside the set reads as neutral.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "surprised" => Emotion::Surprised,
            "thinking" => Emotion::Thinking,
            _ => Emotion::Neutral,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Sad => "😢",
            Emotion::Angry => "😠",
            Emotion::Surprised => "😲",
            Emotion::Neutral => "😐",
            Emotion::Thinking => "🤔",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_is_lenient() {
        assert_eq!(Emotion::from_tag("Happy"), Emotion::Happy);
        assert_eq!(Emotion::from_tag(" thinking "), Emotion::Thinking);
        assert_eq!(Emotion::from_tag("ecstatic"), Emotion::Neutral);
        assert_eq!(Emotion::from_tag(""), Emotion::Neutral);
    }
}
