mod config;
mod errors;
mod extraction;
mod jd;
mod llm_client;
mod models;
mod ranking;
mod routes;
mod scoring;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::OllamaClient;
use crate::routes::build_router;
use crate::scoring::config::ScoringConfig;
use crate::scoring::pipeline::ScoringServices;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shortlister v{}", env!("CARGO_PKG_VERSION"));

    // Scoring config is validated before the listener binds
    let scoring = ScoringConfig::load(&config.scoring_config_path).with_context(|| {
        format!(
            "loading scoring config from {}",
            config.scoring_config_path.display()
        )
    })?;
    info!(
        "Scoring config loaded: {} rubric questions, embeddings={}, llm={}",
        scoring.rubric.len(),
        scoring.models.embeddings,
        scoring.models.llm
    );

    // Initialize model daemon client (embeddings + generation)
    let ollama = Arc::new(OllamaClient::new(
        &config.ollama_url,
        Duration::from_secs(config.service_timeout_secs),
    )?);
    info!("Model client initialized ({})", ollama.base_url());

    let state = AppState {
        config: config.clone(),
        scoring: Arc::new(scoring),
        services: ScoringServices {
            embedder: ollama.clone(),
            generator: ollama,
            retry: RetryPolicy::default(),
        },
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a frontend origin is configured

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
