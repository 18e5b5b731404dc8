//! Axum route handlers for the page scrape API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::fetcher::extract::ScrapedPage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// POST /api/v1/pages/scrape
///
/// Returns every text node and link of a page. Handy for checking what a site
/// serves before pointing the recommender at it.
pub async fn handle_scrape(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapedPage>, AppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let page = state.fetcher.scrape(url).await?;
    Ok(Json(page))
}
