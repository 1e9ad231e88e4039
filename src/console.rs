// Terminal reporting for `tether run`

use crate::agent::{AgentEvent, AgentObserver, AgentState};
use std::io::{self, Write};

/// Writes agent progress to stderr, keeping stdout for the final answer
pub struct ConsoleObserver {
    stream_tokens: bool,
    mid_line: bool,
}

impl ConsoleObserver {
    pub fn new(stream_tokens: bool) -> Self {
        Self {
            stream_tokens,
            mid_line: false,
        }
    }

    fn end_stream(&mut self, err: &mut impl Write) {
        if self.mid_line {
            let _ = writeln!(err);
            self.mid_line = false;
        }
    }
}

impl AgentObserver for ConsoleObserver {
    fn on_event(&mut self, event: AgentEvent<'_>) {
        let mut err = io::stderr().lock();

        match event {
            AgentEvent::Token(token) => {
                if self.stream_tokens {
                    let _ = write!(err, "{}", token);
                    let _ = err.flush();
                    self.mid_line = true;
                }
            }
            AgentEvent::Progress {
                step,
                max_steps,
                phase: AgentState::Thinking,
            } => {
                self.end_stream(&mut err);
                let _ = writeln!(err, "[step {}/{}] thinking...", step, max_steps);
            }
            AgentEvent::Progress { .. } => {}
            AgentEvent::Thought(thought) => {
                self.end_stream(&mut err);
                if !self.stream_tokens {
                    let _ = writeln!(err, "  thought: {}", thought);
                }
            }
            AgentEvent::Command(command) => {
                if !self.stream_tokens {
                    let _ = writeln!(err, "  cmd: {}", command.lines().next().unwrap_or_default());
                }
            }
            AgentEvent::ToolResult(result) => {
                if result.success {
                    let mut note = format!("  ok ({} lines", result.lines_returned);
                    if result.truncated {
                        note.push_str(", truncated");
                    }
                    note.push(')');
                    let _ = writeln!(err, "{}", note);
                } else {
                    let _ = writeln!(err, "  error: {}", result.error);
                }
            }
            AgentEvent::Finished(_) => {
                self.end_stream(&mut err);
                let _ = writeln!(err, "[done]");
            }
            AgentEvent::Error(message) => {
                self.end_stream(&mut err);
                let _ = writeln!(err, "[error] {}", message);
            }
        }
    }
}
