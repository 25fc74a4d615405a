mod activity;
mod ai_client;
mod config;
mod db;
mod email;
mod errors;
mod export;
mod intake;
mod models;
mod pipeline;
mod routes;
mod state;
mod sweeper;
mod workflow;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::AiClient;
use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::pipeline::ats::KeywordAtsScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::registry::RunRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rezoom API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    init_schema(&pool).await?;

    // Initialize AI client
    let ai = AiClient::new(
        config.ollama_url.clone(),
        config.ai_model.clone(),
        config.ai_timeout,
    );
    info!("AI client initialized (model: {})", ai.model());

    // Initialize ATS scorer (KeywordAtsScorer by default)
    let ats_scorer = Arc::new(KeywordAtsScorer);

    // Export artifacts live here until the sweeper reclaims them
    tokio::fs::create_dir_all(&config.tmp_dir).await?;

    if config.smtp.is_none() {
        info!("SMTP not configured; email delivery disabled");
    }

    // Build app state
    let state = AppState {
        db: pool.clone(),
        ai,
        config: config.clone(),
        ats_scorer,
        runs: RunRegistry::new(),
    };

    // Background retention sweeper
    sweeper::spawn(pool, config.tmp_dir.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
