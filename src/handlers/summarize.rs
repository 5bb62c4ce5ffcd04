use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::error::ApiError;
use crate::fingerprint::resolve_fingerprint;
use crate::metrics::{QUOTA_DENIALS, REQUEST_TOTAL, UPSTREAM_FAILURES, UPSTREAM_LATENCY};
use crate::models::{MeteredResponse, SummarizeRequest, SummarizeResponse};
use crate::quota::{Decision, QuotaPolicy};
use crate::state::AppState;

pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SummarizeRequest>,
) -> Result<Json<MeteredResponse<SummarizeResponse>>, ApiError> {
    REQUEST_TOTAL.inc();

    let key = resolve_fingerprint(&headers);
    let remaining = match state.summarize_quota.check_and_consume(&key) {
        Decision::Denied { retry_after } => {
            QUOTA_DENIALS.inc();
            info!(route = "summarize", retry_after_secs = retry_after.as_secs(), "quota exhausted");
            return Err(ApiError::QuotaExceeded { retry_after });
        }
        Decision::Allowed { remaining } => remaining,
    };

    let start_time = Instant::now();
    let result = state.upstream.summarize(&payload).await;
    UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

    match result {
        Ok(inner) => Ok(Json(MeteredResponse {
            inner,
            remaining_generations: remaining,
        })),
        Err(err) => {
            UPSTREAM_FAILURES.inc();
            Err(err.into())
        }
    }
}
