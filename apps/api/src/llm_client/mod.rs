//! Anthropic Messages client used to draft one definition per request.
//!
//! One prompt in, one text answer out. No retries: a failed call surfaces
//! as a 502 and the caller decides whether to ask again.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Used when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
/// A definition is a single sentence of at most a few hundred characters.
const DEFINITION_MAX_TOKENS: u32 = 400;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model stopped at the token limit before finishing the definition")]
    Truncated,

    #[error("model returned no text")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct DraftRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct DraftResponse {
    content: Vec<Block>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the composed prompt and returns the raw definition text.
    pub async fn draft_definition(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let body = DraftRequest {
            model: &self.model,
            max_tokens: DEFINITION_MAX_TOKENS,
            system,
            messages: [UserTurn {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_message(raw),
            });
        }

        let draft: DraftResponse = response.json().await?;
        debug!(
            "Definition drafted by {} (stop_reason={:?})",
            self.model, draft.stop_reason
        );
        draft_text(draft)
    }
}

/// The API's own error message when the body carries one, else the raw body.
fn api_message(raw: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&raw)
        .map(|e| e.error.message)
        .unwrap_or(raw)
}

fn draft_text(draft: DraftResponse) -> Result<String, LlmError> {
    if draft.stop_reason.as_deref() == Some("max_tokens") {
        return Err(LlmError::Truncated);
    }
    let text: String = draft
        .content
        .into_iter()
        .filter_map(|block| match block {
            Block::Text { text } => Some(text),
            Block::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text.to_string())
}
