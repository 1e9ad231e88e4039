// Inference engine contract
//
// The controller depends only on this trait. A handle is owned explicitly,
// loaded once, and never driven by two calls at the same time.

use super::BrainError;
use async_trait::async_trait;
use std::sync::atomic::AtomicBool;

#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Acquire the model. Calling it on a loaded handle reloads.
    async fn load(&mut self, model: &str, context_window: u32) -> Result<(), BrainError>;

    /// Generate text for `prompt` under `grammar`.
    ///
    /// Every generated piece is passed to `on_token` in order. `cancel` is
    /// polled between pieces; when it is set the text produced so far is
    /// returned.
    async fn infer(
        &self,
        prompt: &str,
        grammar: &str,
        max_tokens: u32,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
        cancel: &AtomicBool,
    ) -> Result<String, BrainError>;

    /// Release the model
    async fn unload(&mut self);

    fn is_loaded(&self) -> bool;
}
