//! memuc Process Runner
//!
//! The seam between typed operations and the real memuc executable. Blocking
//! runs capture stdout and wait for exit; detached runs only collect the
//! task handle memuc prints before it returns.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::invocation::Invocation;

/// Exit code reported for detached runs
pub const DETACHED_EXIT_CODE: i32 = -1;

/// Exit code and stdout of a finished memuc run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub text: String,
}

impl ProcessOutput {
    pub fn new(exit_code: i32, text: impl Into<String>) -> Self {
        Self {
            exit_code,
            text: text.into(),
        }
    }

    /// Output of a detached run, whose exit code is never observed
    pub fn detached(text: impl Into<String>) -> Self {
        Self::new(DETACHED_EXIT_CODE, text)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs memuc invocations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion and capture stdout
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessOutput>;

    /// Start a background task and return the raw handle text memuc prints
    async fn spawn_detached(&self, invocation: &Invocation) -> std::io::Result<String>;
}

/// Runner backed by `tokio::process`.
///
/// stdout is the parsed channel; stderr is captured and only logged.
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    memuc_path: PathBuf,
}

impl TokioProcessRunner {
    pub fn new(memuc_path: impl Into<PathBuf>) -> Self {
        Self {
            memuc_path: memuc_path.into(),
        }
    }

    /// Path of the memuc executable
    pub fn memuc_path(&self) -> &Path {
        &self.memuc_path
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&self.memuc_path);
        cmd.args(invocation.tokens())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Keep memuc from flashing a console window
        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }

    async fn capture(&self, invocation: &Invocation) -> std::io::Result<ProcessOutput> {
        debug!("memuc {}", invocation.command_line());

        let output = self.command(invocation).output().await?;
        let exit_code = output.status.code().unwrap_or(-1);
        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        let mut lines = text.lines();
        if let Some(first) = lines.next() {
            debug!("\tOutput: {}", first);
            for line in lines {
                debug!("\t\t{}", line);
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("\tStderr: {}", stderr.trim());
        }

        if exit_code != 0 {
            warn!("memuc {} exited with {}", invocation.subcommand(), exit_code);
        }

        Ok(ProcessOutput { exit_code, text })
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessOutput> {
        self.capture(invocation).await
    }

    async fn spawn_detached(&self, invocation: &Invocation) -> std::io::Result<String> {
        // memuc returns as soon as the task is queued when given `-t`
        let output = self.capture(invocation).await?;
        Ok(output.text)
    }
}
