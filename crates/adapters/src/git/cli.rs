// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git adapter backed by the `git` executable

use super::{GitAdapter, GitError};
use crate::subprocess::{run_with_timeout, stderr_or_status, GIT_COMMAND_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Runs `git clone` as a subprocess.
#[derive(Clone)]
pub struct CliGit {
    binary: String,
    clone_timeout: Duration,
}

impl Default for CliGit {
    fn default() -> Self {
        Self {
            binary: crate::env::git_binary(),
            clone_timeout: crate::env::git_timeout(),
        }
    }
}

impl CliGit {
    pub fn new(binary: impl Into<String>, clone_timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            clone_timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        // Never block on a credential prompt inside the child
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }
}

#[async_trait]
impl GitAdapter for CliGit {
    async fn clone_repo(
        &self,
        url: &str,
        revision: Option<&str>,
        dest: &Path,
    ) -> Result<(), GitError> {
        let mut cmd = self.command();
        cmd.arg("clone").arg("--quiet").arg("--").arg(url).arg(dest);
        let output = run_with_timeout(cmd, self.clone_timeout, "git clone")
            .await
            .map_err(|message| GitError::CloneFailed {
                url: url.to_string(),
                message,
            })?;
        if !output.status.success() {
            return Err(GitError::CloneFailed {
                url: url.to_string(),
                message: stderr_or_status(&output),
            });
        }

        let Some(revision) = revision else {
            return Ok(());
        };
        let mut cmd = self.command();
        cmd.arg("-C")
            .arg(dest)
            .args(["checkout", "--quiet", revision]);
        let output = run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, "git checkout")
            .await
            .map_err(|message| GitError::CheckoutFailed {
                revision: revision.to_string(),
                message,
            })?;
        if !output.status.success() {
            return Err(GitError::CheckoutFailed {
                revision: revision.to_string(),
                message: stderr_or_status(&output),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
