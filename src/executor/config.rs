// Executor configuration

use crate::executor::types::ToolLimits;
use std::path::PathBuf;

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Size caps for every tool call
    pub limits: ToolLimits,
    /// Initial working root; canonicalized when the executor is built
    pub working_dir: PathBuf,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            limits: ToolLimits::default(),
            working_dir: PathBuf::from("."),
        }
    }
}

impl ExecutorConfig {
    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Default::default()
        }
    }
}
