pub mod config;
pub mod error;
pub mod fingerprint;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod quota;
pub mod state;
pub mod upstream;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

use state::AppState;

// Full route table; shared between main and the integration tests
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/generate", post(handlers::generate_handler))
        .route("/api/summarize", post(handlers::summarize_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}
