// Agent errors

use thiserror::Error;

/// Run-ending agent errors
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("Failed to load model {model}: {reason}")]
    ModelLoad { model: String, reason: String },

    #[error("No task set. Call start_task first.")]
    NoTask,

    #[error("Invalid working directory: {0}")]
    InvalidRoot(String),

    #[error("Inference error: {0}")]
    Inference(String),

    /// The engine broke the THOUGHT/CMD output contract
    #[error("Failed to parse model output: {raw}")]
    MalformedResponse { raw: String },

    #[error("Maximum steps ({max_steps}) reached. Task may be incomplete.")]
    StepBudgetExhausted { max_steps: u32 },
}
