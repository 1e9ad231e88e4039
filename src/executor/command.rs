// Tool command parsing
//
// One agent-issued command string becomes one typed `ToolCommand`. Parse
// errors carry the literal usage line for the verb so the model can correct
// itself on the next step.

use crate::executor::{ExecutorError, Result};

const READ_USAGE: &str = "READ_LINES <path> <start>-<end> (e.g. READ_LINES src/main.rs 1-40)";
const GREP_USAGE: &str = "GREP <pattern> <path> (e.g. GREP \"fn main\" src/)";
const INFO_USAGE: &str = "FILE_INFO <path> (e.g. FILE_INFO src/main.rs)";
const CREATE_USAGE: &str = "CREATE <path> (e.g. CREATE src/new.rs)";
const WRITE_USAGE: &str = "WRITE <path> <start>-<end>\\n<content>\\nEND_WRITE";
const INSERT_USAGE: &str = "INSERT <path> <after_line>\\n<content>\\nEND_INSERT";
const DELETE_USAGE: &str = "DELETE_LINES <path> <start>-<end> (e.g. DELETE_LINES src/main.rs 10-12)";
const FINISH_USAGE: &str = "FINISH <summary of what was done>";

/// Sentinel closing a WRITE content block
pub const END_WRITE: &str = "END_WRITE";
/// Sentinel closing an INSERT content block
pub const END_INSERT: &str = "END_INSERT";

/// A parsed tool command, one variant per verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCommand {
    ReadLines {
        path: String,
        start: usize,
        end: usize,
    },
    Grep {
        pattern: String,
        path: String,
    },
    List {
        path: String,
    },
    FileInfo {
        path: String,
    },
    Create {
        path: String,
    },
    Write {
        path: String,
        start: usize,
        end: usize,
        content: String,
    },
    Insert {
        path: String,
        after_line: usize,
        content: String,
    },
    DeleteLines {
        path: String,
        start: usize,
        end: usize,
    },
    Finish {
        summary: String,
    },
}

impl ToolCommand {
    /// Parse a command; the verb is case-insensitive.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_start();
        if text.trim().is_empty() {
            return Err(ExecutorError::EmptyCommand);
        }

        let (verb, args) = match text.find(char::is_whitespace) {
            Some(idx) => {
                let sep_len = text[idx..].chars().next().map_or(1, char::len_utf8);
                (&text[..idx], &text[idx + sep_len..])
            }
            None => (text, ""),
        };

        match verb.to_ascii_uppercase().as_str() {
            "READ_LINES" => {
                let (path, start, end) = path_and_range(args, READ_USAGE)?;
                Ok(Self::ReadLines { path, start, end })
            }
            "GREP" => {
                let mut tokens = Tokens::new(args);
                let pattern = tokens
                    .next()
                    .ok_or_else(|| syntax("Missing search pattern", GREP_USAGE))?;
                let path = tokens.next().unwrap_or_else(|| ".".to_string());
                Ok(Self::Grep { pattern, path })
            }
            "LIST" => Ok(Self::List {
                path: single_path(args).unwrap_or_else(|| ".".to_string()),
            }),
            "FILE_INFO" => Ok(Self::FileInfo {
                path: single_path(args).ok_or_else(|| syntax("Missing path", INFO_USAGE))?,
            }),
            "CREATE" => Ok(Self::Create {
                path: single_path(args).ok_or_else(|| syntax("Missing path", CREATE_USAGE))?,
            }),
            "DELETE_LINES" => {
                let (path, start, end) = path_and_range(args, DELETE_USAGE)?;
                Ok(Self::DeleteLines { path, start, end })
            }
            "WRITE" => {
                let (header, body) = split_block(args, WRITE_USAGE)?;
                let (path, start, end) = path_and_range(header, WRITE_USAGE)?;
                Ok(Self::Write {
                    path,
                    start,
                    end,
                    content: block_content(body, END_WRITE),
                })
            }
            "INSERT" => {
                let (header, body) = split_block(args, INSERT_USAGE)?;
                let mut tokens = Tokens::new(header);
                let path = tokens
                    .next()
                    .ok_or_else(|| syntax("Missing path", INSERT_USAGE))?;
                let line = tokens
                    .next()
                    .ok_or_else(|| syntax("Missing line number", INSERT_USAGE))?;
                let after_line = line.parse().map_err(|_| {
                    syntax(
                        &format!("Invalid line number '{}' (0 inserts at the beginning)", line),
                        INSERT_USAGE,
                    )
                })?;
                Ok(Self::Insert {
                    path,
                    after_line,
                    content: block_content(body, END_INSERT),
                })
            }
            "FINISH" => {
                if args.trim().is_empty() {
                    return Err(syntax("Missing summary", FINISH_USAGE));
                }
                Ok(Self::Finish {
                    summary: args.to_string(),
                })
            }
            _ => Err(ExecutorError::UnknownCommand(verb.to_string())),
        }
    }

    /// Canonical verb for this command
    pub fn verb(&self) -> &'static str {
        match self {
            Self::ReadLines { .. } => "READ_LINES",
            Self::Grep { .. } => "GREP",
            Self::List { .. } => "LIST",
            Self::FileInfo { .. } => "FILE_INFO",
            Self::Create { .. } => "CREATE",
            Self::Write { .. } => "WRITE",
            Self::Insert { .. } => "INSERT",
            Self::DeleteLines { .. } => "DELETE_LINES",
            Self::Finish { .. } => "FINISH",
        }
    }

    /// Whether this command modifies the filesystem
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Write { .. } | Self::Insert { .. } | Self::DeleteLines { .. }
        )
    }
}

fn syntax(message: &str, usage: &'static str) -> ExecutorError {
    ExecutorError::Syntax(message.to_string(), usage)
}

fn path_and_range(args: &str, usage: &'static str) -> Result<(String, usize, usize)> {
    let mut tokens = Tokens::new(args);
    let path = tokens.next().ok_or_else(|| syntax("Missing path", usage))?;
    let range = tokens
        .next()
        .ok_or_else(|| syntax("Missing line range", usage))?;
    let (start, end) = parse_range(&range)
        .ok_or_else(|| syntax(&format!("Invalid line range format '{}'", range), usage))?;
    Ok((path, start, end))
}

/// `<start>-<end>` with both sides plain integers
fn parse_range(range: &str) -> Option<(usize, usize)> {
    let (start, end) = range.split_once('-')?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

/// A single path argument: a quoted token, or the whole first line trimmed
fn single_path(args: &str) -> Option<String> {
    let line = args.lines().next().unwrap_or("").trim();
    if line.starts_with('"') {
        return Tokens::new(line).next();
    }
    (!line.is_empty()).then(|| line.to_string())
}

/// Split a block command into its header line and the text after it
fn split_block<'a>(args: &'a str, usage: &'static str) -> Result<(&'a str, &'a str)> {
    args.split_once('\n')
        .ok_or_else(|| syntax("Missing content block. Content must start on the next line", usage))
}

/// Content up to the sentinel (wherever it appears), minus one trailing newline
fn block_content(body: &str, sentinel: &str) -> String {
    let content = match body.find(sentinel) {
        Some(idx) => &body[..idx],
        None => body,
    };
    content.strip_suffix('\n').unwrap_or(content).to_string()
}

/// Whitespace-separated tokens; double quotes group a token containing spaces
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let input = self.rest.trim_start();
        if input.is_empty() {
            self.rest = input;
            return None;
        }

        if let Some(quoted) = input.strip_prefix('"') {
            let (token, rest) = match quoted.find('"') {
                Some(close) => (&quoted[..close], &quoted[close + 1..]),
                None => (quoted, ""),
            };
            self.rest = rest;
            return Some(token.to_string());
        }

        let end = input.find(char::is_whitespace).unwrap_or(input.len());
        self.rest = &input[end..];
        Some(input[..end].to_string())
    }
}
