// Brain client - HTTP communication with the completion server

use super::types::{parse_event_line, HealthResponse};
use super::{
    BrainConfig, BrainError, BrainInitError, CompletionRequest, CompletionRequestBuilder,
    InferenceEngine,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Model the handle is currently bound to
#[derive(Debug, Clone)]
struct LoadedModel {
    model: String,
    context_window: u32,
}

/// Inference engine backed by a llama.cpp-compatible server
pub struct Brain {
    config: BrainConfig,
    client: Client,
    loaded: Option<LoadedModel>,
}

impl Brain {
    /// Create a new, unloaded Brain
    pub fn new(config: BrainConfig) -> Result<Self, BrainInitError> {
        info!(
            endpoint = %config.endpoint,
            timeout_secs = config.request_timeout_secs,
            max_retries = config.max_retries,
            "initializing brain"
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(BrainInitError::ClientError)?;

        Ok(Self {
            config,
            client,
            loaded: None,
        })
    }

    /// Model reference of the loaded handle
    pub fn model(&self) -> Option<&str> {
        self.loaded.as_ref().map(|m| m.model.as_str())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    /// Send the request, retrying retryable failures with exponential backoff.
    ///
    /// Retries only happen before any response body is read, so no token is
    /// ever delivered twice.
    async fn send_with_retry(&self, request: &CompletionRequest) -> Result<Response, BrainError> {
        let start = Instant::now();
        let mut retries = 0;
        let max_retries = self.config.max_retries;
        let base_delay = Duration::from_millis(self.config.base_retry_delay_ms);

        loop {
            debug!(retry = retries, "sending request to inference backend");
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    retries += 1;
                    if retries > max_retries {
                        error!(
                            retries = retries,
                            total_latency_ms = start.elapsed().as_millis(),
                            error = %e,
                            "inference failed: exhausted retries"
                        );
                        return Err(BrainError::Exhausted {
                            retries,
                            last_error: e.to_string(),
                        });
                    }

                    let multiplier = 2u64.saturating_pow(retries - 1);
                    let delay_ms = base_delay.as_millis() as u64 * multiplier;
                    let delay = Duration::from_millis(delay_ms.min(30000));

                    warn!(
                        retry = retries,
                        max_retries = max_retries,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "inference failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, BrainError> {
        let url = self.url("/completion");
        debug!(url = %url, "sending HTTP request");

        let response = self
            .authorize(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "received HTTP response");

        if status.is_success() {
            Ok(response)
        } else if status.as_u16() == 401 {
            Err(BrainError::AuthenticationFailed(
                response.text().await.unwrap_or_default(),
            ))
        } else if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            Err(BrainError::ModelError(body))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(BrainError::InvalidRequest(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl InferenceEngine for Brain {
    async fn load(&mut self, model: &str, context_window: u32) -> Result<(), BrainError> {
        info!(model = %model, context_window, "loading model");

        let response = self
            .authorize(self.client.get(self.url("/health")))
            .send()
            .await
            .map_err(|e| BrainError::LoadFailed(e.to_string()))?;

        let status = response.status();
        let health: HealthResponse = response.json().await.unwrap_or_default();
        if !status.is_success() {
            error!(status = status.as_u16(), server_status = %health.status, "inference server not ready");
            return Err(BrainError::LoadFailed(format!(
                "server at {} reported HTTP {} ({})",
                self.config.endpoint, status, health.status
            )));
        }

        self.loaded = Some(LoadedModel {
            model: model.to_string(),
            context_window,
        });
        info!(model = %model, server_status = %health.status, "model loaded");
        Ok(())
    }

    async fn infer(
        &self,
        prompt: &str,
        grammar: &str,
        max_tokens: u32,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
        cancel: &AtomicBool,
    ) -> Result<String, BrainError> {
        let loaded = self.loaded.as_ref().ok_or(BrainError::NotLoaded)?;

        let request = CompletionRequestBuilder::new(prompt)
            .grammar(grammar)
            .max_tokens(max_tokens)
            .stream(true)
            .temperature(self.config.temperature)
            .top_p(self.config.top_p)
            .top_k(self.config.top_k)
            .build()
            .map_err(|e| BrainError::InvalidRequest(e.to_string()))?;

        info!(
            model = %loaded.model,
            context_window = loaded.context_window,
            prompt_chars = prompt.len(),
            has_grammar = request.grammar.is_some(),
            max_tokens,
            "starting inference"
        );

        let start = Instant::now();
        let mut response = self.send_with_retry(&request).await?;

        let mut text = String::new();
        let mut pending: Vec<u8> = Vec::new();
        let mut tokens = 0u32;
        let mut stopped = false;

        'stream: while let Some(bytes) = response.chunk().await? {
            pending.extend_from_slice(&bytes);

            while let Some(newline) = pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline).collect();
                let line = String::from_utf8_lossy(&line);

                if let Some(event) = parse_event_line(line.trim_end()) {
                    let chunk = event?;
                    if !chunk.content.is_empty() {
                        tokens += 1;
                        on_token(&chunk.content);
                        text.push_str(&chunk.content);
                    }
                    if chunk.stop {
                        tokens = chunk.tokens_predicted.unwrap_or(tokens);
                        stopped = true;
                        break 'stream;
                    }
                }

                if cancel.load(Ordering::SeqCst) {
                    warn!(tokens, "inference cancelled");
                    break 'stream;
                }
            }
        }

        info!(
            tokens,
            stopped,
            output_chars = text.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "inference completed"
        );
        Ok(text)
    }

    async fn unload(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            info!(model = %loaded.model, "model unloaded");
        }
    }

    fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }
}
