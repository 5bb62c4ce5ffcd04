use serde::{Deserialize, Serialize};

// Text-completion request forwarded to the provider
#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
}

// Provider's completion response
#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateResponse {
    pub model: String,
    pub response: String,
}

// Summarization request forwarded to the provider
#[derive(Deserialize, Serialize, Clone)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default = "default_max_sentences")]
    pub max_sentences: u32,
}

fn default_max_sentences() -> u32 {
    3
}

#[derive(Deserialize, Serialize, Clone)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Provider response plus the quota balance, so the client UI can show
/// "N uses left".
#[derive(Serialize)]
pub struct MeteredResponse<T: Serialize> {
    #[serde(flatten)]
    pub inner: T,
    #[serde(rename = "remainingGenerations")]
    pub remaining_generations: u32,
}
