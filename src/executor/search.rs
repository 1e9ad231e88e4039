// GREP - bounded, case-insensitive regex scan

use crate::executor::editor::split_lines;
use crate::executor::sandbox::Sandbox;
use crate::executor::types::{ToolLimits, ToolResult};
use crate::executor::{ExecutorError, Result};
use regex::{Regex, RegexBuilder};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scan a file, or the regular files directly inside a directory, for
/// `pattern`. Stops after `max_grep_results` matches across all files.
pub async fn grep(
    sandbox: &Sandbox,
    limits: &ToolLimits,
    pattern: &str,
    path: &str,
) -> Result<ToolResult> {
    let resolved = sandbox.resolve(path)?;

    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|_| ExecutorError::NotFound(path.to_string()))?;

    let files = if metadata.is_dir() {
        immediate_files(&resolved, path).await?
    } else {
        vec![resolved]
    };

    let regex = compile(pattern)?;

    let max = limits.max_grep_results;
    let mut output = String::new();
    let mut matches = 0;
    let mut truncated = false;

    'files: for file in &files {
        // Unreadable entries are skipped rather than failing the whole scan
        let Ok(bytes) = tokio::fs::read(file).await else {
            continue;
        };
        let text = String::from_utf8_lossy(&bytes);
        let rel = sandbox.relative_display(file);

        for (idx, line) in split_lines(&text).iter().enumerate() {
            if !regex.is_match(line) {
                continue;
            }
            if matches == max {
                truncated = true;
                break 'files;
            }
            let _ = writeln!(output, "{}:{}: {}", rel, idx + 1, line);
            matches += 1;
        }
    }

    if matches == 0 {
        let _ = writeln!(output, "No matches found for pattern: {}", pattern);
    } else if truncated {
        let _ = writeln!(output, "[Results truncated at {} matches]", max);
    }

    debug!(pattern = %pattern, path = %path, files = files.len(), matches, truncated, "grep finished");
    Ok(ToolResult::success(output)
        .with_lines(matches)
        .with_truncated(truncated))
}

fn compile(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// Regular files directly under `dir`, sorted by name. No recursion.
async fn immediate_files(dir: &Path, display: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ExecutorError::ReadFailed(display.to_string(), e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ExecutorError::ReadFailed(display.to_string(), e))?
    {
        if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
