//! Application configuration
//!
//! Sources, later ones winning: built-in defaults, an optional `cafe.toml`
//! (or any format the `config` crate understands) in the working directory,
//! then `CAFE_*` environment variables. Nested keys use a double underscore,
//! e.g. `CAFE_RULES__CONSUMPTION_TICKS=20`.

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::domain::value_objects::SimulationRules;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ollama API base URL (OpenAI-compatible)
    pub ollama_base_url: String,
    /// Model used for NPC dialogue
    pub ollama_model: String,
    /// Per-request timeout for the dialogue model
    pub request_timeout_secs: u64,

    /// Period of the wander tick
    pub wander_interval_ms: u64,
    /// Period of the consumption tick
    pub consumption_interval_ms: u64,
    /// Fixed seed for wander randomness; random when unset
    pub rng_seed: Option<u64>,

    /// Tick counts and rewards
    pub rules: SimulationRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434/v1".to_string(),
            ollama_model: "qwen3:8b".to_string(),
            request_timeout_secs: 30,
            wander_interval_ms: 800,
            consumption_interval_ms: 1000,
            rng_seed: None,
            rules: SimulationRules::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `cafe.*` and the environment
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name("cafe").required(false))
            .add_source(
                Environment::with_prefix("CAFE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.wander_interval_ms > 0, "wander_interval_ms must be positive");
        ensure!(
            self.consumption_interval_ms > 0,
            "consumption_interval_ms must be positive"
        );
        ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );
        ensure!(
            self.rules.level_xp_step > 0,
            "rules.level_xp_step must be positive"
        );
        ensure!(
            self.rules.consumption_ticks > 0,
            "rules.consumption_ticks must be positive"
        );
        ensure!(
            self.rules.order_mission_threshold > 0,
            "rules.order_mission_threshold must be positive"
        );
        Ok(())
    }

    pub fn wander_interval(&self) -> Duration {
        Duration::from_millis(self.wander_interval_ms)
    }

    pub fn consumption_interval(&self) -> Duration {
        Duration::from_millis(self.consumption_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig> {
        AppConfig::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = from_toml("").unwrap();
        assert_eq!(config.wander_interval(), Duration::from_millis(800));
        assert_eq!(config.consumption_interval(), Duration::from_secs(1));
        assert_eq!(config.rules, SimulationRules::default());
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn test_file_overrides_nested_rules() {
        let config = from_toml(
            r#"
            ollama_model = "llama3.1"
            rng_seed = 7

            [rules]
            consumption_ticks = 10
            order_patience_ticks = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.ollama_model, "llama3.1");
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.rules.consumption_ticks, 10);
        assert_eq!(config.rules.order_patience_ticks, Some(30));
        assert_eq!(config.rules.leaving_ticks, 5);
    }

    #[test]
    fn test_rejects_zero_interval() {
        assert!(from_toml("wander_interval_ms = 0").is_err());
    }

    #[test]
    fn test_rejects_zero_rule_counts() {
        assert!(from_toml("[rules]\nconsumption_ticks = 0").is_err());
        assert!(from_toml("[rules]\norder_mission_threshold = 0").is_err());
        assert!(from_toml("[rules]\nlevel_xp_step = 0").is_err());
        assert!(from_toml("[rules]\nleaving_ticks = 0").is_ok());
    }
}
