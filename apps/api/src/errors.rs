use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::composition::shared_state::StateKey;
use crate::llm_client::LlmError;

/// Fatal setup errors: bad option maps, unusable rule data, broken module catalogs.
///
/// Raised before any request is served (or, for per-request option maps, before
/// composition starts).
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{key}' must be a boolean, got {value}")]
    InvalidOptionValue { key: String, value: String },

    #[error("options must be a JSON object")]
    OptionsNotAnObject,

    #[error("rule set is empty")]
    EmptyRuleSet,

    #[error("malformed rule {id:?}: {reason}")]
    MalformedRule { id: String, reason: String },

    #[error("duplicate rule id '{0}'")]
    DuplicateRule(String),

    #[error("failed to read rules from {path}: {reason}")]
    RuleFile { path: String, reason: String },

    #[error("module '{0}' is registered more than once")]
    DuplicateModule(String),

    #[error("module '{module}' depends on '{dependency}', which is not registered")]
    MissingDependency { module: String, dependency: String },

    #[error("dependency cycle between modules: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),
}

/// A broken inter-module contract. Never recovered at runtime.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("module '{writer}' wrote '{key}', which is owned by '{owner}'")]
    WrongProducer {
        key: StateKey,
        owner: String,
        writer: String,
    },

    #[error("'{key}' was published twice (second write by '{writer}')")]
    DuplicateWrite { key: StateKey, writer: String },

    #[error("module '{consumer}' requires '{key}', which was never published")]
    MissingKey { key: StateKey, consumer: String },
}

/// Errors a module may return from `execute`.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Unexpected failure inside the module; the orchestrator drops the fragment
    /// and keeps composing.
    #[error("{0}")]
    Execution(String),

    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Contract violation: {0}")]
    Contract(ContractViolation),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl From<ComposeError> for AppError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::InvalidRequest(msg) => AppError::Validation(msg),
            ComposeError::Contract(violation) => AppError::Contract(violation),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Llm(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            // Per-request option maps are the only configuration reaching a handler.
            AppError::Configuration(e) => (
                StatusCode::BAD_REQUEST,
                "CONFIGURATION_ERROR",
                e.to_string(),
            ),
            AppError::Contract(violation) => {
                tracing::error!("Contract violation: {violation}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONTRACT_VIOLATION",
                    "Prompt composition hit a broken module contract".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The language model call failed".to_string(),
                )
            }
            AppError::NotImplemented(msg) => {
                (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
