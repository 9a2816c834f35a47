//! Dialogue Service - Talks to the language model on behalf of NPCs
//!
//! Every public method is infallible from the caller's point of view: model
//! errors and malformed answers are logged and replaced with a local
//! fallback so that nothing from the model can break the simulation.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::application::dto::{
    ChatTurn, DialogueReply, DialogueRequest, Greeting, GreetingDto, NpcReplyDto,
};
use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::application::services::llm::prompt_builder;
use crate::domain::entities::Npc;

const GREETING_TEMPERATURE: f32 = 1.0;
const REPLY_TEMPERATURE: f32 = 0.8;
const MEMORY_TEMPERATURE: f32 = 0.3;

/// Errors that can occur while talking to the model
#[derive(Debug, thiserror::Error)]
pub enum DialogueServiceError {
    /// Error from the underlying LLM client
    #[error("LLM error: {0}")]
    LlmError(String),
    /// The model's answer could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Service for NPC dialogue generation
pub struct DialogueService<L: LlmPort> {
    llm: L,
}

impl<L: LlmPort> DialogueService<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    /// Opening line for a conversation. Falls back to the NPC's scripted
    /// initial message.
    #[instrument(skip(self, npc), fields(npc_id = %npc.id))]
    pub async fn greet(&self, npc: &Npc) -> Greeting {
        match self.try_greet(npc).await {
            Ok(greeting) => greeting,
            Err(e) => {
                warn!(error = %e, "Greeting failed, using fallback");
                Greeting::fallback(npc)
            }
        }
    }

    /// NPC reply to one player turn. Falls back to a neutral "..." reply.
    #[instrument(skip(self, request), fields(npc_id = %request.npc.id))]
    pub async fn respond(&self, request: &DialogueRequest) -> DialogueReply {
        match self.try_respond(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Reply failed, using fallback");
                DialogueReply::fallback()
            }
        }
    }

    /// Summarise a finished conversation into the NPC's memory. Keeps the
    /// previous memory when there is nothing to summarise or the model fails.
    #[instrument(skip(self, npc, history), fields(npc_id = %npc.id))]
    pub async fn summarize_memory(&self, npc: &Npc, history: &[ChatTurn]) -> String {
        if history.is_empty() {
            return npc.memory.clone();
        }
        match self.try_summarize(npc, history).await {
            Ok(memory) if !memory.is_empty() => memory,
            Ok(_) => npc.memory.clone(),
            Err(e) => {
                warn!(error = %e, "Memory update failed, keeping previous memory");
                npc.memory.clone()
            }
        }
    }

    async fn try_greet(&self, npc: &Npc) -> Result<Greeting, DialogueServiceError> {
        let request = LlmRequest::new(vec![ChatMessage::user("Start the conversation.")])
            .with_system_prompt(prompt_builder::build_greeting_prompt(npc))
            .with_temperature(GREETING_TEMPERATURE)
            .with_json_mode();

        let content = self.generate(request).await?;
        let dto: GreetingDto = parse_json(&content)?;
        Ok(dto.into_greeting(npc))
    }

    async fn try_respond(
        &self,
        request: &DialogueRequest,
    ) -> Result<DialogueReply, DialogueServiceError> {
        let mut messages =
            prompt_builder::build_conversation_history(&request.npc, &request.history);
        messages.push(ChatMessage::user(request.utterance.clone()));

        let llm_request = LlmRequest::new(messages)
            .with_system_prompt(prompt_builder::build_reply_prompt(request))
            .with_temperature(REPLY_TEMPERATURE)
            .with_json_mode();

        let content = self.generate(llm_request).await?;
        let dto: NpcReplyDto = parse_json(&content)?;
        Ok(dto.into())
    }

    async fn try_summarize(
        &self,
        npc: &Npc,
        history: &[ChatTurn],
    ) -> Result<String, DialogueServiceError> {
        let request = LlmRequest::new(vec![ChatMessage::user("Summarize the memory.")])
            .with_system_prompt(prompt_builder::build_memory_prompt(npc, history))
            .with_temperature(MEMORY_TEMPERATURE)
            .with_max_tokens(Some(200));

        Ok(self.generate(request).await?.trim().to_string())
    }

    async fn generate(&self, request: LlmRequest) -> Result<String, DialogueServiceError> {
        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| DialogueServiceError::LlmError(e.to_string()))?;
        debug!(model = %response.model, tokens = response.tokens_used, "Model answered");
        Ok(response.content)
    }
}

/// Parse the JSON object in a model answer, tolerating code fences or
/// chatter around it
fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, DialogueServiceError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(DialogueServiceError::ParseError(
                "no JSON object in response".to_string(),
            ))
        }
    };
    serde_json::from_str(json).map_err(|e| DialogueServiceError::ParseError(e.to_string()))
}
