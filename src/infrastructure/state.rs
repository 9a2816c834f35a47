//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::application::services::{CafeSession, DialogueService};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::seed::build_cafe_state;
use crate::infrastructure::tick_workers::SharedSession;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// The single cafe session, shared by the console and the tick workers
    pub session: SharedSession,
    pub dialogue: Arc<DialogueService<OllamaClient>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let llm_client = OllamaClient::new(
            &config.ollama_base_url,
            &config.ollama_model,
            config.request_timeout(),
        )
        .context("Failed to build the Ollama client")?;

        let cafe = build_cafe_state(&config.rules)?;
        let session = CafeSession::new(cafe, config.rules.clone());

        Ok(Self {
            config,
            session: Arc::new(Mutex::new(session)),
            dialogue: Arc::new(DialogueService::new(llm_client)),
        })
    }
}
