//! memuc Client
//!
//! Entry point for all memuc operations. Each operation builds an
//! [`Invocation`], hands it to a [`ProcessRunner`] and interprets the output.
//! The operations themselves live in `manage`, `control`, `apps` and `device`.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use memu_core::MemucConfig;

use crate::error::{MemucError, Result};
use crate::invocation::Invocation;
use crate::process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
use crate::response::{ParsedValue, ResponseInterpreter, ResultShape};
use crate::vm::{Outcome, TaskId};

/// memuc client
#[derive(Clone)]
pub struct MemucClient {
    runner: Arc<dyn ProcessRunner>,
    interpreter: ResponseInterpreter,
}

impl std::fmt::Debug for MemucClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemucClient")
            .field("interpreter", &self.interpreter)
            .finish_non_exhaustive()
    }
}

impl MemucClient {
    /// Create a client for the memuc executable at `memuc_path`
    pub fn new(memuc_path: impl Into<PathBuf>) -> Self {
        Self::from_config(&MemucConfig::default(), memuc_path)
    }

    /// Create a client using the failure markers from `config`
    pub fn from_config(config: &MemucConfig, memuc_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(
            Arc::new(TokioProcessRunner::new(memuc_path)),
            ResponseInterpreter::from_config(config),
        )
    }

    /// Create a client over any process runner
    pub fn with_runner(runner: Arc<dyn ProcessRunner>, interpreter: ResponseInterpreter) -> Self {
        Self { runner, interpreter }
    }

    pub fn interpreter(&self) -> &ResponseInterpreter {
        &self.interpreter
    }

    /// Run an invocation and parse its output into `shape`.
    ///
    /// Detached invocations only yield the task handle memuc prints.
    pub async fn run_shape(&self, invocation: &Invocation, shape: ResultShape) -> Result<ParsedValue> {
        let output = if invocation.is_detached() {
            debug!("Detaching memuc {}", invocation.command_line());
            ProcessOutput::detached(self.runner.spawn_detached(invocation).await?)
        } else {
            debug!("Dispatching memuc {}", invocation.command_line());
            self.runner.run(invocation).await?
        };

        self.interpreter.interpret(invocation.subcommand(), &output, shape)
    }

    /// Run an invocation and unwrap the value of its declared shape
    pub(crate) async fn run_as<T>(&self, invocation: &Invocation, shape: ResultShape) -> Result<T>
    where
        T: TryFrom<ParsedValue, Error = ParsedValue>,
    {
        let value = self.run_shape(invocation, shape).await?;
        T::try_from(value).map_err(|value| MemucError::ShapeMismatch {
            operation: invocation.subcommand().to_string(),
            value,
        })
    }

    /// Run an invocation whose only result is success
    pub(crate) async fn run_bool(&self, invocation: &Invocation) -> Result<bool> {
        self.run_as(invocation, ResultShape::Bool).await
    }

    /// Run a success-only invocation that may be detached
    pub(crate) async fn run_outcome(&self, invocation: &Invocation) -> Result<Outcome<bool>> {
        if invocation.is_detached() {
            let task_id: TaskId = self.run_as(invocation, ResultShape::TaskId).await?;
            debug!("memuc {} queued as task {}", invocation.subcommand(), task_id);
            return Ok(Outcome::Detached(task_id));
        }

        self.run_bool(invocation).await.map(Outcome::Completed)
    }
}

/// Reject empty string arguments before anything is built
pub(crate) fn require_non_empty(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MemucError::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(())
}
