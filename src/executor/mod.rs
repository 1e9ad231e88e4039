// Executor module - sandboxed, line-granular file tools
#![allow(unused_imports)]

pub mod command;
pub mod config;
pub mod editor;
pub mod error;
pub mod runner;
pub mod sandbox;
pub mod search;
pub mod types;

pub use command::ToolCommand;
pub use config::ExecutorConfig;
pub use error::{ExecutorError, Result};
pub use runner::Executor;
pub use sandbox::Sandbox;
pub use types::{ToolLimits, ToolResult};
