use std::sync::Arc;

use crate::config::Config;
use crate::fetcher::ContentFetcher;
use crate::recommendation::pipeline::RecommendationPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecommendationPipeline>,
    /// Used directly by the page scrape endpoint; shares its client with the pipeline.
    pub fetcher: ContentFetcher,
    pub config: Config,
}
