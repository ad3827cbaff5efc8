mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
mod visualizer;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tower_http::{
    cors::{AllowHeaders, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{GeminiClient, GenerationParams};
use crate::routes::build_router;
use crate::state::AppState;
use crate::visualizer::fallback::FallbackLibrary;
use crate::visualizer::generator::Visualizer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MindCanvas API v{}", env!("CARGO_PKG_VERSION"));

    match config.api_key() {
        Some(key) => info!(
            "Google AI API key loaded: {}...",
            key.chars().take(6).collect::<String>()
        ),
        None => error!(
            "Google AI API key not found or invalid. Set GOOGLE_AI_API_KEY; \
            serving fallback descriptions only"
        ),
    }

    let llm = GeminiClient::new(config.api_key().map(str::to_string), config.llm_timeout())?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.llm_timeout_secs
    );

    let visualizer = Visualizer::new(
        Arc::new(llm),
        GenerationParams::default(),
        FallbackLibrary::new(config.fallback_match),
    );

    let state = AppState {
        visualizer: Arc::new(visualizer),
    };

    let origin = config
        .cors_allowed_origin
        .parse::<HeaderValue>()
        .context("CORS_ALLOWED_ORIGIN must be a valid origin")?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
