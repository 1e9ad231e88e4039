// Agent loop - observe, think, act

use crate::brain::InferenceEngine;
use crate::executor::Executor;

use super::error::AgentError;
use super::observer::{AgentEvent, AgentObserver, TracingObserver};
use super::parse::parse_model_output;
use super::prompt::{build_prompt, AGENT_GRAMMAR};
use super::types::{AgentConfig, AgentState, AgentStep, RunOutcome, StepOutcome, TaskContext};

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Drives one task at a time against an owned inference engine.
///
/// History and the step counter belong to the loop alone; one step runs at a
/// time and each blocks on inference.
pub struct AgentLoop<E: InferenceEngine> {
    engine: E,
    executor: Executor,
    config: AgentConfig,
    observer: Box<dyn AgentObserver>,
    state: AgentState,
    task: Option<TaskContext>,
    history: Vec<AgentStep>,
    last_error: Option<AgentError>,
}

impl<E: InferenceEngine> AgentLoop<E> {
    pub fn new(engine: E, executor: Executor, config: AgentConfig) -> Self {
        Self {
            engine,
            executor,
            config,
            observer: Box::new(TracingObserver),
            state: AgentState::Ready,
            task: None,
            history: Vec::new(),
            last_error: None,
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Box<dyn AgentObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Load the configured model into the engine
    pub async fn init(&mut self) -> Result<(), AgentError> {
        info!(
            model = %self.config.model,
            context_window = self.config.context_window,
            "loading model"
        );

        if let Err(e) = self
            .engine
            .load(&self.config.model, self.config.context_window)
            .await
        {
            let err = AgentError::ModelLoad {
                model: self.config.model.clone(),
                reason: e.to_string(),
            };
            self.enter_error(err.clone());
            return Err(err);
        }

        info!(model = %self.config.model, "model loaded");
        Ok(())
    }

    /// Clear any previous run and bind a new task to `working_dir`
    pub fn start_task(
        &mut self,
        description: impl Into<String>,
        working_dir: impl AsRef<Path>,
    ) -> Result<(), AgentError> {
        self.reset();

        self.executor
            .set_working_dir(working_dir.as_ref())
            .map_err(|e| AgentError::InvalidRoot(e.to_string()))?;

        let task = TaskContext::new(description, self.executor.working_dir().to_path_buf());
        info!(
            task = %task.description,
            root = %task.working_dir.display(),
            max_steps = self.config.max_steps,
            "task started"
        );
        self.task = Some(task);
        Ok(())
    }

    /// Run one observe/think/act iteration
    pub async fn step(&mut self, cancel: &AtomicBool) -> StepOutcome {
        if self.state.is_terminal() {
            debug!(state = %self.state, "step on terminal state ignored");
            return StepOutcome::Idle;
        }

        if cancel.load(Ordering::SeqCst) {
            return self.enter_interrupted();
        }

        let Some(task) = self.task.as_mut() else {
            return StepOutcome::Failed(AgentError::NoTask);
        };
        task.step_count += 1;
        let step = task.step_count;
        let prompt = build_prompt(
            &task.description,
            &task.working_dir,
            &self.history,
            self.config.history_window,
        );

        self.set_phase(AgentState::Thinking, step);

        let observer = &mut self.observer;
        let mut on_token = |token: &str| observer.on_event(AgentEvent::Token(token));
        let response = self
            .engine
            .infer(
                &prompt,
                AGENT_GRAMMAR,
                self.config.max_tokens_per_step,
                &mut on_token,
                cancel,
            )
            .await;

        if cancel.load(Ordering::SeqCst) {
            return self.enter_interrupted();
        }

        let raw = match response {
            Ok(raw) => raw,
            Err(e) => return self.fail(AgentError::Inference(e.to_string())),
        };
        debug!(step, response_len = raw.len(), "inference complete");

        let Some((thought, command)) = parse_model_output(&raw) else {
            return self.fail(AgentError::MalformedResponse { raw });
        };
        self.observer.on_event(AgentEvent::Thought(&thought));
        self.observer.on_event(AgentEvent::Command(&command));

        self.set_phase(AgentState::Executing, step);
        let result = self.executor.execute(&command).await;
        self.observer.on_event(AgentEvent::ToolResult(&result));

        let observation = match self.history.last() {
            Some(previous) => previous.result.observation(),
            None => self.initial_observation(),
        };
        let finished = result.finished;
        let summary = result.output.clone();
        self.history.push(AgentStep {
            observation,
            thought,
            command,
            result,
        });

        if finished {
            self.state = AgentState::Finished;
            if let Some(task) = self.task.as_mut() {
                task.final_summary = summary.clone();
            }
            info!(step, "task finished");
            self.observer.on_event(AgentEvent::Finished(&summary));
            return StepOutcome::Finished;
        }

        if step >= self.config.max_steps {
            return self.fail(AgentError::StepBudgetExhausted {
                max_steps: self.config.max_steps,
            });
        }

        self.state = AgentState::Ready;
        StepOutcome::Continue
    }

    /// Step until the task reaches a terminal state
    pub async fn run(&mut self, cancel: &AtomicBool) -> RunOutcome {
        loop {
            if self.state == AgentState::Ready && self.step_count() >= self.config.max_steps {
                self.fail(AgentError::StepBudgetExhausted {
                    max_steps: self.config.max_steps,
                });
            }

            match self.step(cancel).await {
                StepOutcome::Continue => continue,
                StepOutcome::Finished => {
                    return RunOutcome::Finished {
                        summary: self.final_summary().to_string(),
                    };
                }
                StepOutcome::Interrupted => return RunOutcome::Interrupted,
                StepOutcome::Failed(e) => return RunOutcome::Failed(e),
                StepOutcome::Idle => return self.terminal_outcome(),
            }
        }
    }

    /// Back to Ready with no task. The model stays loaded.
    #[allow(dead_code)]
    pub fn reset(&mut self) {
        self.state = AgentState::Ready;
        self.task = None;
        self.history.clear();
        self.last_error = None;
    }

    pub async fn unload(&mut self) {
        self.engine.unload().await;
        info!("model unloaded");
    }

    pub fn is_model_loaded(&self) -> bool {
        self.engine.is_loaded()
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Every recorded step, oldest first
    pub fn history(&self) -> &[AgentStep] {
        &self.history
    }

    pub fn step_count(&self) -> u32 {
        self.task.as_ref().map_or(0, |t| t.step_count)
    }

    /// FINISH text of the last completed task, empty otherwise
    pub fn final_summary(&self) -> &str {
        self.task.as_ref().map_or("", |t| t.final_summary.as_str())
    }

    /// Error that ended the current run, if any
    #[allow(dead_code)]
    pub fn last_error(&self) -> Option<&AgentError> {
        self.last_error.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn initial_observation(&self) -> String {
        match &self.task {
            Some(task) => format!(
                "Working directory: {}\nTask: {}",
                task.working_dir.display(),
                task.description
            ),
            None => String::new(),
        }
    }

    fn set_phase(&mut self, phase: AgentState, step: u32) {
        self.state = phase;
        self.observer.on_event(AgentEvent::Progress {
            step,
            max_steps: self.config.max_steps,
            phase,
        });
    }

    fn enter_interrupted(&mut self) -> StepOutcome {
        warn!(step = self.step_count(), "task interrupted");
        self.state = AgentState::Interrupted;
        StepOutcome::Interrupted
    }

    fn enter_error(&mut self, err: AgentError) {
        error!(error = %err, "agent entered error state");
        self.state = AgentState::Error;
        self.observer.on_event(AgentEvent::Error(&err.to_string()));
        self.last_error = Some(err);
    }

    fn fail(&mut self, err: AgentError) -> StepOutcome {
        self.enter_error(err.clone());
        StepOutcome::Failed(err)
    }

    fn terminal_outcome(&self) -> RunOutcome {
        match self.state {
            AgentState::Finished => RunOutcome::Finished {
                summary: self.final_summary().to_string(),
            },
            AgentState::Interrupted => RunOutcome::Interrupted,
            _ => RunOutcome::Failed(self.last_error.clone().unwrap_or(AgentError::NoTask)),
        }
    }
}
