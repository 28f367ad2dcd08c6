use anyhow::{Context, Result};

use crate::composition::PromptConfig;
use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Fails at startup if a set variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub rules_path: String,
    /// Default module options, from the `PROMPT_OPTIONS` JSON object.
    pub prompt_options: PromptConfig,
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let prompt_options = match lookup("PROMPT_OPTIONS") {
            Some(raw) if !raw.trim().is_empty() => PromptConfig::from_json_str(&raw)
                .context("PROMPT_OPTIONS must be a JSON object of boolean module options")?,
            _ => PromptConfig::default(),
        };

        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            rules_path: lookup("RULES_PATH").unwrap_or_else(|| "config/rules.json".to_string()),
            prompt_options,
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
            llm_model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}
