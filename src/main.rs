mod agent;
mod brain;
mod config;
mod console;
mod executor;

use agent::{AgentConfig, AgentLoop, RunOutcome};
use brain::{Brain, BrainConfig};
use clap::{Parser, Subcommand};
use console::ConsoleObserver;
use executor::{Executor, ExecutorConfig};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncReadExt;
use tokio::signal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::fmt;

const EXIT_ERROR: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

/// Sandboxed line-level coding agent
#[derive(Debug, Parser)]
#[command(name = "tether")]
#[command(about = "Run a small-model coding agent inside one directory")]
struct Cli {
    /// TOML file with [agent] and [inference] tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a task until the agent finishes
    Run {
        /// Working directory the agent is confined to
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Override the step budget
        #[arg(long)]
        max_steps: Option<u32>,

        /// Echo model output as it is generated
        #[arg(long)]
        stream: bool,

        /// Task description
        task: String,
    },
    /// Execute one tool command and print the result
    Exec {
        /// Working directory the command is confined to
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Command text, or `-` to read it from stdin
        command: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Command::Run {
            root,
            max_steps,
            stream,
            task,
        } => run_task(cli.config, root, max_steps, stream, task).await?,
        Command::Exec {
            root,
            json,
            command,
        } => exec_command(root, json, command).await?,
    };

    if code != 0 {
        process::exit(code);
    }
    Ok(())
}

async fn run_task(
    config_file: Option<PathBuf>,
    root: PathBuf,
    max_steps: Option<u32>,
    stream: bool,
    task: String,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut agent_config = AgentConfig::load(config_file.as_deref())?;
    if let Some(max_steps) = max_steps {
        agent_config.max_steps = max_steps;
    }
    let brain_config = BrainConfig::load(config_file.as_deref())?;

    info!(
        endpoint = %brain_config.endpoint,
        model = %agent_config.model,
        max_steps = agent_config.max_steps,
        "Configuration loaded"
    );

    let brain = Brain::new(brain_config)?;
    let executor = Executor::new(ExecutorConfig::with_working_dir(&root))?;
    let mut agent = AgentLoop::new(brain, executor, agent_config)
        .with_observer(Box::new(ConsoleObserver::new(stream)));

    if let Err(e) = agent.init().await {
        error!(error = %e, "Model initialization failed");
        return Ok(EXIT_ERROR);
    }
    info!(
        model = agent.engine().model().unwrap_or_default(),
        "Model ready"
    );
    agent.start_task(task, &root)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = cancel.clone();
    let signal_handle = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, stopping after current generation");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    let outcome = agent.run(&cancel).await;
    signal_handle.abort();
    info!(
        state = %agent.state(),
        steps = agent.step_count(),
        recorded = agent.history().len(),
        "Run ended"
    );
    agent.unload().await;
    if agent.is_model_loaded() {
        warn!("Model still loaded after unload");
    }

    let code = match outcome {
        RunOutcome::Finished { summary } => {
            println!("{}", summary);
            0
        }
        RunOutcome::Interrupted => {
            info!(steps = agent.step_count(), "Task interrupted");
            EXIT_INTERRUPTED
        }
        RunOutcome::Failed(e) => {
            error!(error = %e, steps = agent.step_count(), "Task failed");
            EXIT_ERROR
        }
    };
    Ok(code)
}

async fn exec_command(
    root: PathBuf,
    json: bool,
    command: String,
) -> Result<i32, Box<dyn std::error::Error>> {
    let command = if command == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        text
    } else {
        command
    };

    let executor = Executor::new(ExecutorConfig::with_working_dir(root))?;
    let result = executor.execute(&command).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.success {
        print!("{}", result.output);
        if !result.output.is_empty() && !result.output.ends_with('\n') {
            println!();
        }
    } else {
        eprintln!("ERROR: {}", result.error);
    }

    Ok(if result.success { 0 } else { EXIT_ERROR })
}
