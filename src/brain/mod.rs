// Brain module - inference collaborator
//
// `InferenceEngine` is the contract the agent controller drives; `Brain` is
// the production engine talking to a llama.cpp-compatible completion server.

pub mod builder;
pub mod client;
pub mod engine;
pub mod error;
pub mod types;

pub use builder::CompletionRequestBuilder;
pub use client::Brain;
pub use engine::InferenceEngine;
pub use error::{BrainError, BrainInitError};
pub use types::CompletionRequest;

use crate::config::{parse_env_opt, parse_env_var, read_section};
use serde::Deserialize;
use std::path::Path;

/// Brain configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Inference server URL
    pub endpoint: String,
    /// Bearer token, if the server requires one
    pub api_key: Option<String>,
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Base retry delay in milliseconds
    pub base_retry_delay_ms: u64,
    /// Request timeout in seconds, generation included
    pub request_timeout_secs: u64,
    /// Temperature (None = use server default)
    pub temperature: Option<f32>,
    /// Top-P nucleus sampling (None = use server default)
    pub top_p: Option<f32>,
    /// Top-K sampling (None = use server default)
    pub top_k: Option<u32>,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080".to_string(),
            api_key: None,
            max_retries: 3,
            base_retry_delay_ms: 1000,
            request_timeout_secs: 300,
            temperature: None,
            top_p: None,
            top_k: None,
        }
    }
}

impl BrainConfig {
    /// Defaults, then `[inference]` from `file`, then `INFERENCE_*` env vars
    pub fn load(file: Option<&Path>) -> Result<Self, BrainInitError> {
        dotenvy::dotenv().ok();

        let mut config: BrainConfig = read_section(file, "inference")
            .map_err(|e| BrainInitError::ConfigInvalid(e.to_string()))?;

        if let Ok(endpoint) = std::env::var("INFERENCE_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("INFERENCE_API_KEY") {
            config.api_key = Some(key);
        }
        config.max_retries = parse_env_var("INFERENCE_MAX_RETRIES", config.max_retries);
        config.base_retry_delay_ms =
            parse_env_var("INFERENCE_RETRY_DELAY_MS", config.base_retry_delay_ms);
        config.request_timeout_secs =
            parse_env_var("INFERENCE_TIMEOUT_SECS", config.request_timeout_secs);
        config.temperature = parse_env_opt("INFERENCE_TEMPERATURE", config.temperature);
        config.top_p = parse_env_opt("INFERENCE_TOP_P", config.top_p);
        config.top_k = parse_env_opt("INFERENCE_TOP_K", config.top_k);

        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(BrainInitError::ConfigInvalid(format!(
                "endpoint must be an http(s) URL, got '{}'",
                config.endpoint
            )));
        }

        Ok(config)
    }
}
