mod config;
mod conversation;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::MemoryStore;
use crate::generation::image::HttpImageFetcher;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Assistant API v{}", env!("CARGO_PKG_VERSION"));

    let llm = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    info!("LLM client initialized (model: {})", config.gemini_model);

    let conversations = MemoryStore::new(config.history_cap);
    info!(
        "Conversation store initialized (cap: {} turns per thread)",
        config.history_cap
    );

    let state = AppState {
        llm: Arc::new(llm),
        conversations: Arc::new(conversations),
        images: Arc::new(HttpImageFetcher::new()),
        retry: RetryPolicy::default(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
