// Line-oriented file editor
//
// All line numbers are 1-indexed and ranges inclusive. Every mutating call
// rewrites the whole file; content blocks are size-capped so that is cheap.

use crate::executor::sandbox::Sandbox;
use crate::executor::types::{ToolLimits, ToolResult};
use crate::executor::{ExecutorError, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

/// Split text into newline-delimited records.
///
/// A trailing newline terminates the last record rather than starting an
/// empty one. `\r` is kept as line content.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n').map(str::to_string).collect()
}

/// Join lines with exactly one trailing newline, or nothing for no lines.
pub fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn check_range(start: usize, end: usize) -> Result<()> {
    if start < 1 || end < start {
        return Err(ExecutorError::InvalidRange(start, end));
    }
    Ok(())
}

/// Line editor over files inside a sandbox
pub struct LineEditor<'a> {
    sandbox: &'a Sandbox,
    limits: &'a ToolLimits,
}

impl<'a> LineEditor<'a> {
    pub fn new(sandbox: &'a Sandbox, limits: &'a ToolLimits) -> Self {
        Self { sandbox, limits }
    }

    /// READ_LINES - emit `<n>: <content>` for the requested span
    pub async fn read_lines(&self, path: &str, start: usize, end: usize) -> Result<ToolResult> {
        check_range(start, end)?;

        let requested = end - start + 1;
        if requested > self.limits.max_read_lines {
            return Err(ExecutorError::TooManyLinesRequested {
                requested,
                max: self.limits.max_read_lines,
            });
        }

        let resolved = self.sandbox.resolve(path)?;
        let lines = self.load_existing_file(path, &resolved).await?;

        let mut output = String::new();
        let last = end.min(lines.len());
        let mut returned = 0;
        for n in start..=last {
            let _ = writeln!(output, "{}: {}", n, lines[n - 1]);
            returned += 1;
        }

        if end > lines.len() {
            let _ = writeln!(output, "[EOF at line {}]", lines.len());
        }

        debug!(path = %path, start, end, returned, "read lines");
        Ok(ToolResult::success(output).with_lines(returned))
    }

    /// LIST - immediate children, directories suffixed with `/`
    pub async fn list_dir(&self, path: &str) -> Result<ToolResult> {
        let resolved = self.sandbox.resolve(path)?;

        let metadata = tokio::fs::metadata(&resolved)
            .await
            .map_err(|_| ExecutorError::NotFound(path.to_string()))?;
        if !metadata.is_dir() {
            return Err(ExecutorError::NotADirectory(path.to_string()));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&resolved)
            .await
            .map_err(|e| ExecutorError::ReadFailed(path.to_string(), e))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ExecutorError::ReadFailed(path.to_string(), e))?
        {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                name.push('/');
            }
            entries.push(name);
        }
        entries.sort();

        if entries.is_empty() {
            return Ok(ToolResult::success("[Empty directory]\n"));
        }

        let max = self.limits.max_list_entries;
        let shown = entries.len().min(max);
        let mut output = String::new();
        for name in &entries[..shown] {
            let _ = writeln!(output, "{}", name);
        }
        let truncated = entries.len() > max;
        if truncated {
            let _ = writeln!(output, "[... {} more entries]", entries.len() - max);
        }

        Ok(ToolResult::success(output)
            .with_lines(shown)
            .with_truncated(truncated))
    }

    /// FILE_INFO - metadata only, never content. Succeeds for missing paths.
    pub async fn file_info(&self, path: &str) -> Result<ToolResult> {
        let resolved = self.sandbox.resolve(path)?;

        let mut output = String::new();
        let Ok(metadata) = tokio::fs::metadata(&resolved).await else {
            let _ = writeln!(output, "exists: false");
            let _ = writeln!(output, "path: {}", path);
            return Ok(ToolResult::success(output));
        };

        let _ = writeln!(output, "exists: true");
        let _ = writeln!(output, "path: {}", path);

        if metadata.is_dir() {
            let mut count = 0;
            let mut dir = tokio::fs::read_dir(&resolved)
                .await
                .map_err(|e| ExecutorError::ReadFailed(path.to_string(), e))?;
            while dir
                .next_entry()
                .await
                .map_err(|e| ExecutorError::ReadFailed(path.to_string(), e))?
                .is_some()
            {
                count += 1;
            }
            let _ = writeln!(output, "type: directory");
            let _ = writeln!(output, "entries: {}", count);
        } else {
            let bytes = tokio::fs::read(&resolved)
                .await
                .map_err(|e| ExecutorError::ReadFailed(path.to_string(), e))?;
            let line_count = split_lines(&String::from_utf8_lossy(&bytes)).len();
            let _ = writeln!(output, "type: file");
            let _ = writeln!(output, "size_bytes: {}", metadata.len());
            let _ = writeln!(output, "line_count: {}", line_count);
        }

        Ok(ToolResult::success(output))
    }

    /// WRITE - replace lines `start..=end` with `content`
    ///
    /// Lines before `start` are kept (padded with blanks past EOF), `end` is
    /// clamped to the last line, lines after `end` are kept.
    pub async fn write_lines(
        &self,
        path: &str,
        start: usize,
        end: usize,
        content: &str,
    ) -> Result<ToolResult> {
        check_range(start, end)?;
        let new_lines = self.content_lines("write", content)?;

        let resolved = self.sandbox.resolve(path)?;
        let lines = self.load_file_for_edit(path, &resolved).await?;

        // Padding past EOF is bounded by the write limit
        let max_start = lines.len() + 1 + self.limits.max_write_lines;
        if start > max_start {
            return Err(ExecutorError::WriteStartTooFar {
                start,
                len: lines.len(),
                max: max_start,
            });
        }

        let keep_before = (start - 1).min(lines.len());
        let mut result: Vec<String> = Vec::with_capacity(lines.len() + new_lines.len());
        result.extend_from_slice(&lines[..keep_before]);
        result.resize(start - 1, String::new());
        result.extend(new_lines.iter().cloned());
        if end < lines.len() {
            result.extend_from_slice(&lines[end..]);
        }

        self.store(path, &resolved, &result).await?;

        info!(path = %path, start, end, new_lines = new_lines.len(), total = result.len(), "lines written");
        Ok(ToolResult::success(format!(
            "Replaced lines {}-{} with {} new lines.\nFile now has {} lines.\n",
            start,
            end,
            new_lines.len(),
            result.len()
        )))
    }

    /// INSERT - add `content` after `after_line` (0 prepends, past EOF appends)
    pub async fn insert_lines(
        &self,
        path: &str,
        after_line: usize,
        content: &str,
    ) -> Result<ToolResult> {
        let new_lines = self.content_lines("insert", content)?;

        let resolved = self.sandbox.resolve(path)?;
        let mut lines = self.load_file_for_edit(path, &resolved).await?;

        let at = after_line.min(lines.len());
        lines.splice(at..at, new_lines.iter().cloned());

        self.store(path, &resolved, &lines).await?;

        info!(path = %path, after_line, new_lines = new_lines.len(), total = lines.len(), "lines inserted");
        Ok(ToolResult::success(format!(
            "Inserted {} lines after line {}.\nFile now has {} lines.\n",
            new_lines.len(),
            after_line,
            lines.len()
        )))
    }

    /// DELETE_LINES - remove `start..=end`; `end` is clamped to EOF
    pub async fn delete_lines(&self, path: &str, start: usize, end: usize) -> Result<ToolResult> {
        check_range(start, end)?;

        let resolved = self.sandbox.resolve(path)?;
        let mut lines = self.load_existing_file(path, &resolved).await?;

        if start > lines.len() {
            return Err(ExecutorError::StartBeyondEof {
                start,
                len: lines.len(),
            });
        }

        let end = end.min(lines.len());
        lines.drain(start - 1..end);
        let deleted = end - start + 1;

        self.store(path, &resolved, &lines).await?;

        info!(path = %path, start, end, deleted, total = lines.len(), "lines deleted");
        Ok(ToolResult::success(format!(
            "Deleted {} lines.\nFile now has {} lines.\n",
            deleted,
            lines.len()
        )))
    }

    /// CREATE - new empty file, creating missing parent directories
    pub async fn create_file(&self, path: &str) -> Result<ToolResult> {
        let resolved = self.sandbox.resolve(path)?;

        if tokio::fs::try_exists(&resolved).await.unwrap_or(false) {
            return Err(ExecutorError::AlreadyExists(path.to_string()));
        }

        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExecutorError::WriteFailed(path.to_string(), e))?;
        }

        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&resolved)
            .await
            .map_err(|e| ExecutorError::WriteFailed(path.to_string(), e))?;

        info!(path = %path, "file created");
        Ok(ToolResult::success(format!("Created empty file: {}\n", path)))
    }

    fn content_lines(&self, op: &'static str, content: &str) -> Result<Vec<String>> {
        let lines = split_lines(content);
        if lines.len() > self.limits.max_write_lines {
            return Err(ExecutorError::ContentTooLarge {
                op,
                count: lines.len(),
                max: self.limits.max_write_lines,
            });
        }
        Ok(lines)
    }

    async fn load_existing_file(&self, path: &str, resolved: &Path) -> Result<Vec<String>> {
        match tokio::fs::metadata(resolved).await {
            Ok(m) if m.is_dir() => return Err(ExecutorError::NotAFile(path.to_string())),
            Ok(_) => {}
            Err(_) => return Err(ExecutorError::NotFound(path.to_string())),
        }
        let text = tokio::fs::read_to_string(resolved)
            .await
            .map_err(|e| ExecutorError::ReadFailed(path.to_string(), e))?;
        Ok(split_lines(&text))
    }

    async fn load_file_for_edit(&self, path: &str, resolved: &Path) -> Result<Vec<String>> {
        match self.load_existing_file(path, resolved).await {
            Err(ExecutorError::NotFound(p)) => Err(ExecutorError::MustCreateFirst(p)),
            other => other,
        }
    }

    async fn store(&self, path: &str, resolved: &Path, lines: &[String]) -> Result<()> {
        tokio::fs::write(resolved, join_lines(lines))
            .await
            .map_err(|e| ExecutorError::WriteFailed(path.to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a"), vec!["a"]);
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a\r", "b\r"]);
    }

    #[test]
    fn test_join_lines_trailing_newline() {
        assert_eq!(join_lines(&[]), "");
        assert_eq!(join_lines(&["a".to_string()]), "a\n");
        assert_eq!(join_lines(&["a".to_string(), "b".to_string()]), "a\nb\n");
    }

    #[test]
    fn test_crlf_round_trip() {
        let text = "one\r\ntwo\r\n";
        assert_eq!(join_lines(&split_lines(text)), text);
    }
}
