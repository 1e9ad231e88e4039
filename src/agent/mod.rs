// Agent module - task controller driving inference and tools

pub mod config;
pub mod error;
pub mod loop_;
pub mod observer;
pub mod parse;
pub mod prompt;
pub mod types;

pub use loop_::AgentLoop;
pub use observer::{AgentEvent, AgentObserver};
pub use types::{AgentConfig, AgentState, RunOutcome};
