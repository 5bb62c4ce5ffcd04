use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::time::Duration;

use crate::upstream::UpstreamError;

/// Errors a guarded route can surface to the client. The quota guard itself
/// never errors — a `Denied` decision is mapped into `QuotaExceeded` by the
/// handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("usage limit reached, retry in {}s", retry_after.as_secs())]
    QuotaExceeded { retry_after: Duration },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::QuotaExceeded { retry_after } => {
                let body = Json(json!({
                    "error": "You have reached your free usage limit. Try again later.",
                    "isRateLimitExceeded": true,
                }));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                // Round up so Retry-After never says 0
                let secs = retry_after.as_secs().max(1).to_string();
                if let Ok(value) = HeaderValue::from_str(&secs) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            ApiError::Upstream(err) => {
                let body = Json(json!({
                    "error": format!("Upstream provider error: {err}"),
                    "isRateLimitExceeded": false,
                }));
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn quota_exceeded_maps_to_429_with_flag() {
        let response = ApiError::QuotaExceeded {
            retry_after: Duration::from_secs(120),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "120"
        );

        let body = body_json(response).await;
        assert_eq!(body["isRateLimitExceeded"], true);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn retry_after_rounds_up_to_one_second() {
        let response = ApiError::QuotaExceeded {
            retry_after: Duration::from_millis(10),
        }
        .into_response();
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    }

    #[tokio::test]
    async fn upstream_failure_is_not_flagged_as_rate_limit() {
        let response =
            ApiError::Upstream(UpstreamError::Status(reqwest::StatusCode::BAD_REQUEST))
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["isRateLimitExceeded"], false);
    }
}
