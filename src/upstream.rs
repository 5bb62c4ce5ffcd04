use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::models::{GenerateRequest, GenerateResponse, SummarizeRequest, SummarizeResponse};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Client for the metered provider API. Opaque from the gateway's point of
/// view: one POST per call, JSON in, JSON out, with a per-call timeout.
/// Quota consumption is committed before any call here, so a failure does
/// not refund the use.
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub async fn complete(&self, req: &GenerateRequest) -> Result<GenerateResponse, UpstreamError> {
        self.post_json("/api/generate", req).await
    }

    pub async fn summarize(
        &self,
        req: &SummarizeRequest,
    ) -> Result<SummarizeResponse, UpstreamError> {
        self.post_json("/api/summarize", req).await
    }

    async fn post_json<Req, Res>(&self, path: &str, req: &Req) -> Result<Res, UpstreamError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let res = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
            .json(req)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(UpstreamError::Status(res.status()));
        }

        Ok(res.json::<Res>().await?)
    }
}
