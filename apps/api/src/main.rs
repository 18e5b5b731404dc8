mod config;
mod errors;
mod fetcher;
mod llm_client;
mod recommendation;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::fetcher::ContentFetcher;
use crate::recommendation::pipeline::RecommendationPipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing GEMINI_API_KEY)
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

    info!(
        "Starting Assessment Recommender v{}",
        env!("CARGO_PKG_VERSION")
    );

    // One fetcher, shared by the pipeline and the scrape endpoint
    let fetcher = ContentFetcher::new().context("Failed to build content fetcher")?;

    // Initialize the recommendation pipeline (fetcher + Gemini client + retry policy)
    let pipeline = RecommendationPipeline::from_config(&config, fetcher.clone())?;
    let policy = pipeline.retry_policy();
    info!(
        "Recommendation pipeline initialized (model: {}, max attempts: {}, backoff: {}s)",
        config.gemini_model,
        policy.max_attempts,
        policy.backoff.as_secs()
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        fetcher,
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
