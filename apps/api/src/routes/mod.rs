pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::fetcher;
use crate::recommendation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/recommendations",
            post(recommendation::handlers::handle_recommend),
        )
        .route(
            "/api/v1/pages/scrape",
            post(fetcher::handlers::handle_scrape),
        )
        .with_state(state)
}
