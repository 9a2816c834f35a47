//! Ollama client for NPC dialogue (OpenAI-compatible chat completions)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::{
    ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole,
};

/// Client for the Ollama `/v1/chat/completions` endpoint
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, OllamaError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn build_body(&self, request: LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system_prompt) = request.system_prompt {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.extend(request.messages);

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.into_iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
            stream: false,
        }
    }
}

#[async_trait]
impl LlmPort for OllamaClient {
    type Error = OllamaError;

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, Self::Error> {
        let body = self.build_body(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            return Err(OllamaError::ApiError {
                status,
                message: error_text,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion.into_response()
    }
}

// Request/Response types for the OpenAI-compatible API

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<ChatMessage> for WireMessage {
    fn from(message: ChatMessage) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        Self {
            role,
            content: message.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

impl ChatCompletionResponse {
    fn into_response(self) -> Result<LlmResponse, OllamaError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(OllamaError::EmptyResponse)?;

        Ok(LlmResponse {
            content,
            model: self.model,
            tokens_used: self.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}

/// Errors from the Ollama client
#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Model returned no choices")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::new("http://localhost:11434/v1/", "qwen3:8b", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_is_trimmed() {
        assert_eq!(client().base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_body_puts_system_prompt_first() {
        let request = LlmRequest::new(vec![ChatMessage::user("Hi")])
            .with_system_prompt("You are Ben.")
            .with_temperature(0.8)
            .with_json_mode();
        let body = serde_json::to_value(client().build_body(request)).unwrap();

        assert_eq!(body["model"], "qwen3:8b");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are Ben.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["stream"], false);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_plain_request_has_no_response_format() {
        let request = LlmRequest::new(vec![ChatMessage::user("Summarize")]);
        let body = serde_json::to_value(client().build_body(request)).unwrap();
        assert!(body.get("response_format").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_parses_completion() {
        let json = r#"{
            "model": "qwen3:8b",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"text\":\"Hi\"}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let completion: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let response = completion.into_response().unwrap();
        assert_eq!(response.content, "{\"text\":\"Hi\"}");
        assert_eq!(response.tokens_used, 15);
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let completion: ChatCompletionResponse =
            serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        assert!(matches!(
            completion.into_response(),
            Err(OllamaError::EmptyResponse)
        ));
    }
}
