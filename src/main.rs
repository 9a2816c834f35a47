//! Cozy Cafe Engine - NPC simulation core for an English-learning cafe game
//!
//! The engine:
//! - Moves customers around the cafe on a wander clock
//! - Runs orders, drinks and departures on a consumption clock
//! - Talks to Ollama for NPC dialogue, feedback and memory
//! - Reads player commands from the console

mod application;
mod domain;
mod infrastructure;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::console;
use crate::infrastructure::state::AppState;
use crate::infrastructure::tick_workers::{consumption_worker, wander_worker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cafe_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Cozy Cafe Engine");

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Ollama: {} ({})", config.ollama_base_url, config.ollama_model);
    tracing::info!(
        "  Ticks: wander {:?}, consumption {:?}",
        config.wander_interval(),
        config.consumption_interval()
    );

    // Initialize application state
    let state = Arc::new(AppState::new(config)?);
    tracing::info!("Application state initialized");

    let rng = match state.config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Start the tick workers
    let wander_task = tokio::spawn(wander_worker(
        state.session.clone(),
        state.config.wander_interval(),
        rng,
    ));
    let consumption_task = tokio::spawn(consumption_worker(
        state.session.clone(),
        state.config.consumption_interval(),
    ));

    // Run the console until quit or Ctrl+C
    tokio::select! {
        result = console::run(state.clone()) => {
            if let Err(e) = result {
                tracing::error!("Console error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    wander_task.abort();
    consumption_task.abort();
    tracing::info!("Workers stopped");

    Ok(())
}
