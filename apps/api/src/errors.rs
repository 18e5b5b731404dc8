use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::llm_client::retry::InvokeError;
use crate::recommendation::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generation service rate limited after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::InvalidUrl(url) => AppError::InvalidUrl(url),
            FetchError::FetchFailed(reason) => AppError::FetchFailed(reason),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::InvalidUrl(url) => AppError::InvalidUrl(url),
            PipelineError::FetchFailed(reason) => AppError::FetchFailed(reason),
            PipelineError::RecommendationUnavailable(InvokeError::GenerationFailed(reason)) => {
                AppError::GenerationFailed(reason)
            }
            PipelineError::RecommendationUnavailable(InvokeError::RetryExhausted { attempts }) => {
                AppError::RetryExhausted { attempts }
            }
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidUrl(url) => (
                StatusCode::BAD_REQUEST,
                "INVALID_URL",
                format!("Please enter a valid HTTP/HTTPS URL (got '{url}')"),
            ),
            AppError::FetchFailed(reason) => {
                tracing::warn!("Fetch failed: {reason}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FETCH_FAILED",
                    format!("Failed to fetch URL: {reason}"),
                )
            }
            AppError::GenerationFailed(reason) => {
                tracing::error!("Generation failed: {reason}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    format!("Recommendations unavailable: {reason}"),
                )
            }
            AppError::RetryExhausted { attempts } => {
                tracing::error!("Generation rate limited after {attempts} attempts");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "RETRY_EXHAUSTED",
                    "API request failed after multiple retries. Please try again later."
                        .to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
