//! Axum route handlers for the Recommendation API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::recommendation::model::RecommendationRecord;
use crate::recommendation::pipeline::{RecommendInput, RecommendationOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<RecommendationRecord>,
    pub outcome: RecommendationOutcome,
    pub message: String,
    pub raw_response: Option<String>,
}

/// POST /api/v1/recommendations
///
/// Body is either `{"text": "..."}` or `{"url": "..."}`. Degraded results
/// (nothing parseable, nothing valid) are still 200s with a distinct `outcome`.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(input): Json<RecommendInput>,
) -> Result<Json<RecommendResponse>, AppError> {
    if let RecommendInput::Url { url } = &input {
        if url.trim().is_empty() {
            return Err(AppError::Validation("url cannot be empty".to_string()));
        }
    }

    let result = state.pipeline.recommend(input).await?;

    Ok(Json(RecommendResponse {
        message: result.outcome.message().to_string(),
        outcome: result.outcome,
        recommendations: result.records,
        raw_response: result.raw_response,
    }))
}
