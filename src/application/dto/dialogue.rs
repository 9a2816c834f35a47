use serde::{Deserialize, Serialize};

use crate::domain::entities::{Item, Npc};
use crate::domain::value_objects::{ConversationId, Emotion, VocabularyEntry};

/// Reply text used when the model fails or answers with nothing
pub const FALLBACK_REPLY: &str = "...";
/// Greeting used when neither the model nor the NPC has one
pub const FALLBACK_GREETING: &str = "Hello!";

// ============================================================================
// Conversation history
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Player,
    Npc,
}

/// One line of a conversation as shown in the chat log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub score: Option<u8>,
    /// Name of the item handed over with this line
    #[serde(default)]
    pub gifted_item: Option<String>,
}

impl ChatTurn {
    pub fn player(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Player,
            text: text.into(),
            feedback: None,
            score: None,
            gifted_item: None,
        }
    }

    pub fn npc(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Npc,
            ..Self::player(text)
        }
    }

    pub fn with_gift(mut self, item_name: impl Into<String>) -> Self {
        self.gifted_item = Some(item_name.into());
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>, score: u8) -> Self {
        self.feedback = Some(feedback.into());
        self.score = Some(score);
        self
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Everything the dialogue model needs for one player turn.
///
/// `npc` is a snapshot taken when the turn was sent; the live NPC may keep
/// changing while the request is in flight.
#[derive(Debug, Clone)]
pub struct DialogueRequest {
    pub conversation_id: ConversationId,
    pub npc: Npc,
    pub history: Vec<ChatTurn>,
    pub utterance: String,
    pub gifted_item: Option<Item>,
}

// ============================================================================
// Replies
// ============================================================================

/// Opening line of a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Greeting {
    pub text: String,
    pub emotion: Emotion,
}

impl Greeting {
    pub fn fallback(npc: &Npc) -> Self {
        Self {
            text: npc
                .initial_message
                .clone()
                .unwrap_or_else(|| FALLBACK_GREETING.to_string()),
            emotion: Emotion::Neutral,
        }
    }
}

/// A parsed NPC reply, safe to apply to the session
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueReply {
    pub text: String,
    pub feedback: String,
    /// Player fluency, 0-10
    pub fluency_score: u8,
    pub emotion: Emotion,
    pub mission_completed: bool,
    pub vocabulary: Vec<VocabularyEntry>,
    pub reward_item: Option<Item>,
    pub ordered_item_name: Option<String>,
}

impl DialogueReply {
    /// Neutral, empty reply used whenever the model cannot be reached or
    /// its answer cannot be parsed
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_REPLY.to_string(),
            feedback: String::new(),
            fluency_score: 0,
            emotion: Emotion::Neutral,
            mission_completed: false,
            vocabulary: Vec::new(),
            reward_item: None,
            ordered_item_name: None,
        }
    }
}

/// A reply tagged with the conversation it belongs to
#[derive(Debug, Clone)]
pub struct DialogueOutcome {
    pub conversation_id: ConversationId,
    pub utterance: String,
    pub reply: DialogueReply,
}

// ============================================================================
// Wire formats
// ============================================================================

/// Greeting JSON as produced by the model
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GreetingDto {
    pub text: Option<String>,
    pub emotion: Option<String>,
}

impl GreetingDto {
    pub fn into_greeting(self, npc: &Npc) -> Greeting {
        let fallback = Greeting::fallback(npc);
        Greeting {
            text: non_blank(self.text).unwrap_or(fallback.text),
            emotion: self
                .emotion
                .as_deref()
                .map(Emotion::from_tag)
                .unwrap_or_default(),
        }
    }
}

/// Reply JSON as produced by the model. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpcReplyDto {
    pub roleplay_response: Option<String>,
    pub educational_feedback: Option<String>,
    pub fluency_score: Option<f64>,
    pub current_emotion: Option<String>,
    pub mission_completed: Option<bool>,
    pub ordered_item_name: Option<String>,
    pub reward_item: Option<RewardItemDto>,
    pub detected_vocabulary: Vec<VocabularyDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RewardItemDto {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VocabularyDto {
    pub word: String,
    pub definition: String,
    pub part_of_speech: String,
    pub example: String,
}

impl From<NpcReplyDto> for DialogueReply {
    fn from(dto: NpcReplyDto) -> Self {
        let fluency_score = dto
            .fluency_score
            .filter(|score| score.is_finite())
            .map(|score| score.round().clamp(0.0, 10.0) as u8)
            .unwrap_or(0);

        let reward_item = dto
            .reward_item
            .filter(|reward| !reward.name.trim().is_empty())
            .map(|reward| Item::new(reward.name.trim(), reward.icon, reward.description));

        let vocabulary = dto
            .detected_vocabulary
            .into_iter()
            .filter(|entry| !entry.word.trim().is_empty())
            .map(|entry| {
                VocabularyEntry::new(
                    entry.word.trim(),
                    entry.definition,
                    entry.part_of_speech,
                    entry.example,
                )
            })
            .collect();

        Self {
            text: non_blank(dto.roleplay_response).unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            feedback: dto.educational_feedback.unwrap_or_default(),
            fluency_score,
            emotion: dto
                .current_emotion
                .as_deref()
                .map(Emotion::from_tag)
                .unwrap_or_default(),
            mission_completed: dto.mission_completed.unwrap_or(false),
            vocabulary,
            reward_item,
            ordered_item_name: non_blank(dto.ordered_item_name),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
