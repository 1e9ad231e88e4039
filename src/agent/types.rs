// Agent types

use super::error::AgentError;
use crate::executor::ToolResult;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Per-task agent configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model reference handed to the inference engine
    pub model: String,
    /// Step budget per task
    pub max_steps: u32,
    /// Generation budget per step
    pub max_tokens_per_step: u32,
    /// Model context size
    pub context_window: u32,
    /// How many recent exchanges the prompt shows
    pub history_window: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "models/Qwen3-0.6B-Q8_0.gguf".to_string(),
            max_steps: 25,
            max_tokens_per_step: 512,
            context_window: 2048,
            history_window: 1,
        }
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Waiting for the next step
    Ready,
    /// Running inference
    Thinking,
    /// Running a tool
    Executing,
    /// FINISH executed
    Finished,
    /// Unrecoverable error
    Error,
    /// Stopped by the interrupt flag
    Interrupted,
}

impl AgentState {
    /// Finished, Error and Interrupted end a run
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AgentState::Finished | AgentState::Error | AgentState::Interrupted
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Ready => "ready",
            AgentState::Thinking => "thinking",
            AgentState::Executing => "executing",
            AgentState::Finished => "finished",
            AgentState::Error => "error",
            AgentState::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded observe/think/act iteration
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct AgentStep {
    /// Result of the previous step, or the task description for the first
    pub observation: String,
    pub thought: String,
    pub command: String,
    pub result: ToolResult,
}

/// Task state owned by the controller
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub description: String,
    pub working_dir: PathBuf,
    pub step_count: u32,
    pub final_summary: String,
}

impl TaskContext {
    pub fn new(description: impl Into<String>, working_dir: PathBuf) -> Self {
        Self {
            description: description.into(),
            working_dir,
            step_count: 0,
            final_summary: String::new(),
        }
    }
}

/// Result of a single `step`
#[derive(Debug)]
pub enum StepOutcome {
    /// Back in Ready; more steps may follow
    Continue,
    /// FINISH executed
    Finished,
    /// Interrupt flag observed
    Interrupted,
    /// Run-ending error
    Failed(AgentError),
    /// Already terminal; nothing was done
    Idle,
}

/// Terminal outcome of `run`
#[derive(Debug)]
pub enum RunOutcome {
    Finished { summary: String },
    Interrupted,
    Failed(AgentError),
}

impl RunOutcome {
    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        matches!(self, RunOutcome::Finished { .. })
    }
}
