use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::fingerprint::resolve_fingerprint;
use crate::metrics::{QUOTA_DENIALS, REQUEST_TOTAL, UPSTREAM_FAILURES, UPSTREAM_LATENCY};
use crate::models::{GenerateRequest, GenerateResponse, MeteredResponse};
use crate::quota::{Decision, QuotaPolicy};
use crate::state::AppState;

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<MeteredResponse<GenerateResponse>>, ApiError> {
    REQUEST_TOTAL.inc();

    let key = resolve_fingerprint(&headers);
    let remaining = match state.generate_quota.check_and_consume(&key) {
        Decision::Denied { retry_after } => {
            QUOTA_DENIALS.inc();
            info!(route = "generate", retry_after_secs = retry_after.as_secs(), "quota exhausted");
            return Err(ApiError::QuotaExceeded { retry_after });
        }
        Decision::Allowed { remaining } => remaining,
    };
    debug!(route = "generate", remaining, "quota consumed");

    // The use is committed at this point; an upstream failure does not
    // refund it.
    let start_time = Instant::now();
    let result = state.upstream.complete(&payload).await;
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
