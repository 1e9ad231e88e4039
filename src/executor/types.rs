// Data types for Executor module

use serde::{Deserialize, Serialize};

/// Outcome of a single tool invocation.
///
/// Built fresh for every call and never mutated after it is returned.
/// `output` is meaningful when `success` is set, `error` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    /// Data returned (file lines, matches, listings, status text)
    #[serde(default)]
    pub output: String,
    /// Corrective error text when the call failed
    #[serde(default)]
    pub error: String,
    /// Lines, matches or entries actually returned
    #[serde(default)]
    pub lines_returned: usize,
    /// Whether the output was capped
    #[serde(default)]
    pub truncated: bool,
    /// Set only by FINISH
    #[serde(default)]
    pub finished: bool,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            ..Default::default()
        }
    }

    pub fn finish(summary: impl Into<String>) -> Self {
        Self {
            success: true,
            output: summary.into(),
            finished: true,
            ..Default::default()
        }
    }

    pub fn with_lines(mut self, lines: usize) -> Self {
        self.lines_returned = lines;
        self
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Text the agent observes for this result.
    pub fn observation(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!("ERROR: {}", self.error)
        }
    }
}

/// Hard caps applied to every tool call
#[derive(Debug, Clone, Copy)]
pub struct ToolLimits {
    /// Maximum lines per READ_LINES call
    pub max_read_lines: usize,
    /// Maximum GREP matches
    pub max_grep_results: usize,
    /// Maximum LIST entries
    pub max_list_entries: usize,
    /// Maximum content lines per WRITE/INSERT block
    pub max_write_lines: usize,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            max_read_lines: 50,
            max_grep_results: 20,
            max_list_entries: 100,
            max_write_lines: 200,
        }
    }
}
