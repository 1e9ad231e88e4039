// Main Executor implementation

use crate::executor::command::ToolCommand;
use crate::executor::config::ExecutorConfig;
use crate::executor::editor::LineEditor;
use crate::executor::error::Result;
use crate::executor::sandbox::Sandbox;
use crate::executor::search;
use crate::executor::types::{ToolLimits, ToolResult};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tool executor bound to one working root
pub struct Executor {
    sandbox: Sandbox,
    limits: ToolLimits,
}

impl Executor {
    /// Create an executor rooted at `config.working_dir`
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        let sandbox = Sandbox::new(&config.working_dir)?;

        debug!(
            root = %sandbox.root().display(),
            max_read_lines = config.limits.max_read_lines,
            max_grep_results = config.limits.max_grep_results,
            max_list_entries = config.limits.max_list_entries,
            max_write_lines = config.limits.max_write_lines,
            "executor initialized"
        );

        Ok(Self {
            sandbox,
            limits: config.limits,
        })
    }

    /// Current working root
    pub fn working_dir(&self) -> &Path {
        self.sandbox.root()
    }

    /// Move the sandbox to a new root
    pub fn set_working_dir(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.sandbox.set_root(path)
    }

    /// Parse and run one agent-issued command string
    pub async fn execute(&self, command: &str) -> ToolResult {
        match ToolCommand::parse(command) {
            Ok(cmd) => self.run(cmd).await,
            Err(e) => {
                warn!(error = %e, "command rejected");
                ToolResult::failure(e.to_string())
            }
        }
    }

    /// Run a parsed command. Errors are folded into the result.
    pub async fn run(&self, command: ToolCommand) -> ToolResult {
        let start = Instant::now();
        let verb = command.verb();
        let mutating = command.is_mutating();

        let result = self.dispatch(command).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(result) => {
                info!(
                    verb,
                    mutating,
                    duration_ms,
                    lines_returned = result.lines_returned,
                    truncated = result.truncated,
                    "tool executed"
                );
                result
            }
            Err(e) => {
                warn!(verb, mutating, duration_ms, error = %e, "tool failed");
                ToolResult::failure(e.to_string())
            }
        }
    }

    async fn dispatch(&self, command: ToolCommand) -> Result<ToolResult> {
        let editor = LineEditor::new(&self.sandbox, &self.limits);

        match command {
            ToolCommand::ReadLines { path, start, end } => {
                editor.read_lines(&path, start, end).await
            }
            ToolCommand::Grep { pattern, path } => {
                search::grep(&self.sandbox, &self.limits, &pattern, &path).await
            }
            ToolCommand::List { path } => editor.list_dir(&path).await,
            ToolCommand::FileInfo { path } => editor.file_info(&path).await,
            ToolCommand::Create { path } => editor.create_file(&path).await,
            ToolCommand::Write {
                path,
                start,
                end,
                content,
            } => editor.write_lines(&path, start, end, &content).await,
            ToolCommand::Insert {
                path,
                after_line,
                content,
            } => editor.insert_lines(&path, after_line, &content).await,
            ToolCommand::DeleteLines { path, start, end } => {
                editor.delete_lines(&path, start, end).await
            }
            ToolCommand::Finish { summary } => Ok(ToolResult::finish(summary)),
        }
    }
}
