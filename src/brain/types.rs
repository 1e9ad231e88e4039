// Data types for Brain module - aligned with the llama.cpp server completion API

use serde::{Deserialize, Serialize};

/// Request body for `POST /completion`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    /// GBNF grammar constraining the generated text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar: Option<String>,
    /// Maximum tokens to generate
    pub n_predict: u32,
    #[serde(default)]
    pub stream: bool,
    /// Reuse the KV cache for a shared prompt prefix
    #[serde(default)]
    pub cache_prompt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// One streamed event (or the whole body when not streaming)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub content: String,
    /// Set on the final event of a generation
    #[serde(default)]
    pub stop: bool,
    #[serde(default)]
    pub tokens_predicted: Option<u32>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}

/// Parse one server-sent-event line.
///
/// Returns `None` for blank lines, comments and non-data fields.
pub fn parse_event_line(line: &str) -> Option<Result<CompletionChunk, serde_json::Error>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(serde_json::from_str(data))
}
