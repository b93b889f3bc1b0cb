mod config;
mod errors;
mod handoff;
mod llm_client;
mod models;
mod quiz;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::handoff::{Handoff, HandoffStore, MemoryHandoffStore, RedisHandoffStore};
use crate::llm_client::LlmClient;
use crate::quiz::session::SessionRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
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

    info!("Starting TechPrep API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize handoff storage
    let store: Arc<dyn HandoffStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            let store = RedisHandoffStore::connect(&client, config.handoff_ttl_secs).await?;
            info!(
                "Handoff store: Redis (entries expire after {}s)",
                config.handoff_ttl_secs
            );
            Arc::new(store)
        }
        None => {
            info!("Handoff store: in-memory (REDIS_URL not set)");
            Arc::new(MemoryHandoffStore::new())
        }
    };
    let handoff = Handoff::new(store);

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let sessions = SessionRegistry::new(handoff.clone(), config.timer());
    info!(
        "Quiz sessions: {} min countdown, {}s grace",
        config.test_duration_minutes, config.time_up_grace_secs
    );

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        handoff,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
