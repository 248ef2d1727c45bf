mod analysis;
mod config;
mod errors;
mod intake;
mod llm_client;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::backend::GeminiBackendFactory;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillSync API v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini_api_key.is_some() {
        info!("Gemini API key loaded from environment");
    } else {
        warn!("GEMINI_API_KEY not set; every analysis must supply its own key");
    }

    // Initialize LLM client
    let llm = GeminiClient::new(
        config.gemini_api_base.clone(),
        config.gemini_timeout_secs.map(Duration::from_secs),
    )?;
    let candidates = config.model_candidates();
    info!("LLM client initialized (models: {})", candidates.join(" -> "));

    let analyzer = Analyzer::new(Arc::new(GeminiBackendFactory::new(llm)), candidates);

    let state = AppState {
        analyzer: Arc::new(analyzer),
        config: config.clone(),
    };

    // TODO: restrict origins once the dashboard has a fixed host
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
