// Error types for Executor module
//
// Every message here ends up in the model's next prompt, so each one says
// what went wrong and how to issue the command correctly.

use thiserror::Error;

/// Executor error types
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Empty command.")]
    EmptyCommand,

    #[error(
        "Unknown command: {0}\nAvailable: READ_LINES, GREP, LIST, FILE_INFO, WRITE, INSERT, DELETE_LINES, CREATE, FINISH"
    )]
    UnknownCommand(String),

    /// Malformed arguments; the second field is the literal usage line.
    #[error("{0}. Use: {1}")]
    Syntax(String, &'static str),

    #[error("Path outside working directory: {0}")]
    SandboxViolation(String),

    #[error("Invalid working directory '{0}': {1}")]
    InvalidRoot(String, String),

    #[error("Invalid line range {0}-{1}. Use 1-indexed positive integers with start <= end.")]
    InvalidRange(usize, usize),

    #[error("Too many lines requested ({requested}). Maximum is {max}. Narrow your request.")]
    TooManyLinesRequested { requested: usize, max: usize },

    #[error("Too many lines to {op} ({count}). Maximum is {max}. Split the change into smaller blocks.")]
    ContentTooLarge {
        op: &'static str,
        count: usize,
        max: usize,
    },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File not found: {0}. Use CREATE first for new files.")]
    MustCreateFirst(String),

    #[error("File already exists: {0}. Use WRITE to modify.")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}. Use LIST for directories.")]
    NotAFile(String),

    #[error("Start line {start} is beyond end of file ({len} lines).")]
    StartBeyondEof { start: usize, len: usize },

    #[error("Start line {start} is too far past end of file ({len} lines). Use a start line of at most {max}.")]
    WriteStartTooFar { start: usize, len: usize, max: usize },

    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Failed to read {0}: {1}")]
    ReadFailed(String, std::io::Error),

    #[error("Failed to write {0}: {1}")]
    WriteFailed(String, std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExecutorError>;
