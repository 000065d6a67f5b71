//! Axum router — maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    analyze::api_analyze,
    news::api_news,
    scoring::{api_default_weights, api_methodology, api_score},
    system::api_health,
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/health",          get(api_health))

        // Scoring
        .route("/api/weights/default", get(api_default_weights))
        .route("/api/score",           post(api_score))
        .route("/api/methodology",     get(api_methodology))

        // Model-backed
        .route("/api/analyze",         post(api_analyze))
        .route("/api/news",            get(api_news))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
