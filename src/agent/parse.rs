// Model output parsing - split a response into THOUGHT and CMD

use super::prompt::{COMMAND_MARKER, THOUGHT_MARKER};

/// Extract `(thought, command)` from a model response.
///
/// Uses the first occurrence of each marker; the command marker must come
/// after the thought marker. The thought is trimmed; the command keeps its
/// internal newlines (WRITE/INSERT bodies) and loses surrounding whitespace.
/// Returns `None` when either part is missing or empty.
pub fn parse_model_output(output: &str) -> Option<(String, String)> {
    let thought_pos = output.find(THOUGHT_MARKER)?;
    let cmd_pos = output.find(COMMAND_MARKER)?;
    if cmd_pos <= thought_pos {
        return None;
    }

    let thought = output[thought_pos + THOUGHT_MARKER.len()..cmd_pos].trim();

    let command = output[cmd_pos + COMMAND_MARKER.len()..]
        .trim_start_matches([' ', '\t'])
        .trim_end();

    if thought.is_empty() || command.is_empty() {
        return None;
    }

    Some((thought.to_string(), command.to_string()))
}
