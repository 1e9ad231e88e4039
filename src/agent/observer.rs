// Agent event reporting
//
// Observers see events in the order they happen and never affect control flow.

use super::AgentState;
use crate::executor::ToolResult;
use tracing::{debug, error, info, trace, warn};

/// Something the controller reports while running
#[derive(Debug, Clone, Copy)]
pub enum AgentEvent<'a> {
    /// Phase change within a step
    Progress {
        step: u32,
        max_steps: u32,
        phase: AgentState,
    },
    Thought(&'a str),
    Command(&'a str),
    ToolResult(&'a ToolResult),
    /// One streamed piece of model output
    Token(&'a str),
    Finished(&'a str),
    Error(&'a str),
}

pub trait AgentObserver: Send {
    fn on_event(&mut self, event: AgentEvent<'_>);
}

/// Discards every event
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct NullObserver;

impl AgentObserver for NullObserver {
    fn on_event(&mut self, _event: AgentEvent<'_>) {}
}

/// Logs every event through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver;

impl AgentObserver for TracingObserver {
    fn on_event(&mut self, event: AgentEvent<'_>) {
        match event {
            AgentEvent::Progress {
                step,
                max_steps,
                phase,
            } => debug!(step, max_steps, phase = %phase, "agent progress"),
            AgentEvent::Thought(thought) => info!(thought = %thought, "agent thought"),
            AgentEvent::Command(command) => {
                let preview = command.lines().next().unwrap_or_default();
                info!(command = %preview, "agent command");
            }
            AgentEvent::ToolResult(result) if result.success => {
                info!(
                    lines_returned = result.lines_returned,
                    truncated = result.truncated,
                    finished = result.finished,
                    "tool result"
                );
            }
            AgentEvent::ToolResult(result) => warn!(error = %result.error, "tool error"),
            AgentEvent::Token(token) => trace!(token = %token, "token"),
            AgentEvent::Finished(summary) => info!(summary = %summary, "task finished"),
            AgentEvent::Error(message) => error!(error = %message, "agent error"),
        }
    }
}
