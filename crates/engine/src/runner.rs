// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Isolated child runner.
//!
//! Each initialization attempt runs in its own process (and process group).
//! The spec goes in on stdin, a single report line comes back on stdout, and
//! the exit status is classified with the 0 / 42 / other protocol.

use crate::retry::RetryPolicy;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use wsd_core::{
    ChildReport, ContentSourceSpec, FailureCode, InitOutcome, EXIT_CONTENT_FAILED, EXIT_SUCCESS,
};

/// Subcommand of the `wsd` binary that acts as the child entry point.
pub const CHILD_SUBCOMMAND: &str = "content-init";

/// How to launch the isolated child.
#[derive(Debug, Clone)]
pub struct ChildCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl ChildCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Re-execute the running binary in child mode.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?).arg(CHILD_SUBCOMMAND))
    }
}

/// Runner tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Budget of a single child run
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            retry: RetryPolicy::default(),
        }
    }
}

impl RunnerConfig {
    /// Defaults overridden by `WSD_INIT_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: crate::env::init_timeout().unwrap_or(defaults.timeout),
            retry: RetryPolicy {
                max_attempts: crate::env::init_max_attempts()
                    .unwrap_or(defaults.retry.max_attempts),
                base_delay: crate::env::init_backoff().unwrap_or(defaults.retry.base_delay),
                max_delay: defaults.retry.max_delay,
            },
        }
    }
}

/// Runs content initialization in a child process, with retries.
#[derive(Debug, Clone)]
pub struct ChildRunner {
    command: ChildCommand,
    config: RunnerConfig,
}

enum Ending {
    Exited(std::io::Result<(ExitStatus, Vec<u8>)>),
    TimedOut,
    Canceled,
}

impl ChildRunner {
    pub fn new(command: ChildCommand, config: RunnerConfig) -> Self {
        Self { command, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run to a final outcome; only that outcome is returned.
    pub async fn run(&self, spec: &ContentSourceSpec, cancel: &CancellationToken) -> InitOutcome {
        self.run_with(spec, cancel, &|_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_attempt` before each attempt.
    pub async fn run_with(
        &self,
        spec: &ContentSourceSpec,
        cancel: &CancellationToken,
        on_attempt: &(dyn Fn(u32) + Send + Sync),
    ) -> InitOutcome {
        let start = Instant::now();
        let mut attempt = 0;
        loop {
            attempt += 1;
            on_attempt(attempt);
            let span = tracing::info_span!(
                "child.run",
                workspace_id = %spec.workspace_id,
                kind = %spec.kind(),
                attempt
            );
            let mut outcome = self.run_once(spec, cancel).instrument(span).await;

            if !self.config.retry.should_retry(attempt, &outcome) || cancel.is_cancelled() {
                outcome.attempts = attempt;
                return outcome.with_duration(start.elapsed());
            }

            let delay = self.config.retry.delay_after(attempt);
            tracing::warn!(
                workspace_id = %spec.workspace_id,
                attempt,
                code = ?outcome.failure_code(),
                delay_ms = delay.as_millis() as u64,
                "content fetch failed, retrying"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    let mut canceled = InitOutcome::canceled();
                    canceled.attempts = attempt;
                    return canceled.with_duration(start.elapsed());
                }
            }
        }
    }

    /// One child run, classified into an outcome.
    pub async fn run_once(
        &self,
        spec: &ContentSourceSpec,
        cancel: &CancellationToken,
    ) -> InitOutcome {
        if cancel.is_cancelled() {
            return InitOutcome::canceled();
        }
        let payload = match serde_json::to_vec(spec) {
            Ok(p) => p,
            Err(e) => return InitOutcome::failed(FailureCode::InvalidSpec, e.to_string()),
        };

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .envs(self.command.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .process_group(0)
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(program = %self.command.program.display(), error = %e, "spawn failed");
                return InitOutcome::failed(
                    FailureCode::ChildCrashed,
                    format!("failed to spawn content initializer: {e}"),
                );
            }
        };
        let pid = child.id();
        tracing::info!(pid, "child started");

        let ending = tokio::select! {
            result = communicate(&mut child, payload) => Ending::Exited(result),
            _ = tokio::time::sleep(self.config.timeout) => Ending::TimedOut,
            _ = cancel.cancelled() => Ending::Canceled,
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match ending {
            Ending::Exited(Ok((status, stdout))) => {
                let outcome = classify(status, &stdout);
                match outcome.failure_code() {
                    None => tracing::info!(elapsed_ms, %status, "child finished"),
                    Some(code) => tracing::warn!(elapsed_ms, %status, %code, "child failed"),
                }
                outcome
            }
            Ending::Exited(Err(e)) => {
                kill_group(pid, &mut child).await;
                tracing::error!(elapsed_ms, error = %e, "lost contact with child");
                InitOutcome::failed(FailureCode::ChildCrashed, format!("child i/o failed: {e}"))
            }
            Ending::TimedOut => {
                kill_group(pid, &mut child).await;
                tracing::warn!(elapsed_ms, "child timed out, killed");
                InitOutcome::failed(
                    FailureCode::Timeout,
                    format!(
                        "content initialization exceeded {}s",
                        self.config.timeout.as_secs_f64()
                    ),
                )
            }
            Ending::Canceled => {
                kill_group(pid, &mut child).await;
                tracing::info!(elapsed_ms, "child killed on cancellation");
                InitOutcome::canceled()
            }
        }
    }
}

/// Feed the spec, drain stdout, and wait for exit.
async fn communicate(
    child: &mut Child,
    payload: Vec<u8>,
) -> std::io::Result<(ExitStatus, Vec<u8>)> {
    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(&payload).await {
            // A child that exits without reading its input is judged by its exit status
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            other => other?,
        }
    }
    let mut stdout = Vec::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_end(&mut stdout).await?;
    }
    let status = child.wait().await?;
    Ok((status, stdout))
}

/// SIGKILL the child's whole process group and reap the child.
async fn kill_group(pid: Option<u32>, child: &mut Child) {
    if let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) {
        if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
            tracing::debug!(pid, error = %e, "killpg failed");
        }
    }
    let _ = child.start_kill();
    if let Err(e) = child.wait().await {
        tracing::warn!(error = %e, "failed to reap child");
    }
}

/// Map exit status and report to an outcome.
pub(crate) fn classify(status: ExitStatus, stdout: &[u8]) -> InitOutcome {
    let report = ChildReport::parse_stdout(&String::from_utf8_lossy(stdout));
    match (status.code(), report) {
        (Some(EXIT_SUCCESS), Some(report)) => report.outcome,
        (Some(EXIT_SUCCESS), None) => InitOutcome::failed(
            FailureCode::ChildCrashed,
            "content initializer exited 0 without a report",
        ),
        (Some(EXIT_CONTENT_FAILED), Some(report)) if !report.outcome.succeeded() => report.outcome,
        (Some(EXIT_CONTENT_FAILED), _) => InitOutcome::failed(
            FailureCode::FetchFailed,
            "content initializer failed without a report",
        ),
        _ => InitOutcome::failed(
            FailureCode::ChildCrashed,
            format!("content initializer terminated abnormally: {status}"),
        ),
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
