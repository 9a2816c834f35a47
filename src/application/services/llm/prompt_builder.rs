//! Prompt building functions for dialogue requests

use crate::application::dto::{ChatTurn, DialogueRequest, Speaker};
use crate::application::ports::outbound::{ChatMessage, MessageRole};
use crate::domain::entities::{menu_names, Npc, NpcVariant, OrderState};

pub const CAFE_NAME: &str = "Cozy Cafe";

/// Build the system prompt for the opening line of a conversation
pub fn build_greeting_prompt(npc: &Npc) -> String {
    let mut prompt = role_header(npc);
    prompt.push_str(&situation(npc));

    prompt.push_str("\nKeep the greeting under 20 words.\n");
    prompt.push_str(
        "Respond with a JSON object: {\"text\": string, \"emotion\": one of \
         \"happy\", \"sad\", \"angry\", \"surprised\", \"neutral\", \"thinking\"}.\n",
    );
    prompt
}

/// Build the system prompt for one conversation turn
pub fn build_reply_prompt(request: &DialogueRequest) -> String {
    let npc = &request.npc;
    let mut prompt = role_header(npc);

    prompt.push_str(&format!("MENU: {}.\n\n", menu_names().join(", ")));
    prompt.push_str(&situation(npc));

    prompt.push_str("\nROLES:\n");
    if npc.variant == NpcVariant::Barista {
        prompt.push_str(
            "- You are the barista. If the owner asks for an item from the MENU, \
             hand it over using \"rewardItem\".\n",
        );
    } else if npc.variant.is_customer() {
        prompt.push_str(
            "- You are a customer. If you have not ordered yet, pick ONE item from \
             the MENU and set \"orderedItemName\".\n",
        );
        if let Some(pending) = npc.pending_order() {
            prompt.push_str(&format!(
                "- If the owner gives you a {}, react happily and set \"missionCompleted\" to true.\n",
                pending
            ));
            prompt.push_str(
                "- If the owner gives you something else, act disappointed and explain \
                 what you actually wanted.\n",
            );
        }
    } else if let Some(trigger) = &npc.mission_trigger {
        prompt.push_str(&format!(
            "- You are an object in the cafe. If the owner talks about \"{}\", \
             set \"missionCompleted\" to true.\n",
            trigger
        ));
    }

    if let Some(item) = &request.gifted_item {
        prompt.push_str(&format!(
            "\nThe owner just gave you a {} ({}).\n",
            item.name, item.icon
        ));
    }

    prompt.push_str(REPLY_FORMAT);
    prompt
}

/// Build the system prompt for summarising a finished conversation
pub fn build_memory_prompt(npc: &Npc, history: &[ChatTurn]) -> String {
    let mut prompt = format!(
        "Update the memory of {}, a {} at \"{}\", about the cafe owner.\n",
        npc.name, npc.role, CAFE_NAME
    );
    if !npc.memory.is_empty() {
        prompt.push_str(&format!("PREVIOUS MEMORY: {}\n", npc.memory));
    }
    prompt.push_str("CONVERSATION:\n");
    for turn in history {
        prompt.push_str(&format!("{}: {}\n", speaker_label(npc, turn.speaker), turn.text));
    }
    prompt.push_str("\nReply with two or three plain sentences, no JSON.\n");
    prompt
}

/// Convert conversation history to chat messages
pub fn build_conversation_history(npc: &Npc, history: &[ChatTurn]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|turn| {
            let role = match turn.speaker {
                Speaker::Player => MessageRole::User,
                Speaker::Npc => MessageRole::Assistant,
            };
            let mut content = format!("{}: {}", speaker_label(npc, turn.speaker), turn.text);
            if let Some(gift) = &turn.gifted_item {
                content.push_str(&format!(" [gives {}]", gift));
            }
            ChatMessage { role, content }
        })
        .collect()
}

fn role_header(npc: &Npc) -> String {
    let mut header = format!("You are {}, a {} at \"{}\".\n", npc.name, npc.role, CAFE_NAME);
    if !npc.personality.is_empty() {
        header.push_str(&format!("PERSONALITY: {}\n", npc.personality));
    }
    if !npc.memory.is_empty() {
        header.push_str(&format!("WHAT YOU REMEMBER ABOUT THE OWNER: {}\n", npc.memory));
    }
    header.push('\n');
    header
}

fn situation(npc: &Npc) -> String {
    match (&npc.order, npc.variant) {
        (_, NpcVariant::Barista) => {
            "You are the Head Barista. You give the owner drinks if they ask for one of the menu items.\n"
                .to_string()
        }
        (OrderState::AwaitingOrder { item_name, .. }, _) => {
            format!("You are waiting for your {}. You are a bit impatient.\n", item_name)
        }
        (OrderState::Consuming { beverage, .. }, _) => {
            format!("You are enjoying your {}.\n", beverage.name)
        }
        (OrderState::Leaving { .. }, _) => "You are about to leave the cafe.\n".to_string(),
        (OrderState::None, variant) if variant.is_customer() => format!(
            "You are a customer ready to order from the menu: {}.\n",
            menu_names().join(", ")
        ),
        (OrderState::None, _) => String::new(),
    }
}

fn speaker_label(npc: &Npc, speaker: Speaker) -> &str {
    match speaker {
        Speaker::Player => "Owner",
        Speaker::Npc => &npc.name,
    }
}

const REPLY_FORMAT: &str = r#"
Respond with a single JSON object with these keys:
- "roleplayResponse": in-character reply, natural English, under 40 words
- "educationalFeedback": short feedback on the owner's grammar and word choice
- "fluencyScore": integer 0-10 rating the owner's last message
- "currentEmotion": one of "happy", "sad", "angry", "surprised", "neutral", "thinking"
- "missionCompleted": boolean
- "orderedItemName": optional, exactly one MENU item name
- "rewardItem": optional object {"name", "icon" (one emoji), "description"}
- "detectedVocabulary": array of 1-2 objects {"word", "definition", "partOfSpeech", "example"}
"#;
