mod composition;
mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod rules;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::composition::Orchestrator;
use crate::config::Config;
use crate::generation::generator::DefinitionWriter;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::rules::RuleSource;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparsable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Definition API v{}", env!("CARGO_PKG_VERSION"));

    // Rules are loaded once and shared read-only by every request
    let rules = RuleSource::load(&config.rules_path)
        .with_context(|| format!("Failed to load rules from {}", config.rules_path))?;

    // Module order is resolved here; a broken catalogue never reaches a request
    let orchestrator = Orchestrator::with_default_modules(Arc::new(rules))
        .context("Invalid prompt module catalogue")?;

    // Model backend is optional; without it /definitions/generate answers 501
    let writer: Option<Arc<dyn DefinitionWriter>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.llm_model.clone())
                .context("Failed to build LLM client")?;
            info!("LLM client initialized (model: {})", client.model());
            Some(Arc::new(client) as Arc<dyn DefinitionWriter>)
        }
        None => {
            info!("ANTHROPIC_API_KEY not set; definition generation disabled");
            None
        }
    };

    let state = AppState {
        prompt_defaults: config.prompt_options,
        orchestrator: Arc::new(orchestrator),
        writer,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
