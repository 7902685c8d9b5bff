// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake git adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{GitAdapter, GitError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded clone call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCall {
    pub url: String,
    pub revision: Option<String>,
    pub dest: PathBuf,
}

#[derive(Default)]
struct FakeGitState {
    /// Files written into `dest` for a known URL
    repos: HashMap<String, Vec<(String, String)>>,
    /// Number of clones of a URL that fail after writing a partial file
    failures: HashMap<String, u32>,
    calls: Vec<GitCall>,
}

/// Fake git adapter: "clones" registered repositories by writing files.
///
/// Unknown URLs fail like an unreachable remote, after leaving a partial
/// file behind so callers' cleanup is exercised.
#[derive(Clone, Default)]
pub struct FakeGit {
    inner: Arc<Mutex<FakeGitState>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository and its file contents.
    pub fn add_repo(&self, url: &str, files: &[(&str, &str)]) {
        self.inner.lock().repos.insert(
            url.to_string(),
            files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        );
    }

    /// Make the next `count` clones of `url` fail.
    pub fn fail_times(&self, url: &str, count: u32) {
        self.inner.lock().failures.insert(url.to_string(), count);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<GitCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl GitAdapter for FakeGit {
    async fn clone_repo(
        &self,
        url: &str,
        revision: Option<&str>,
        dest: &Path,
    ) -> Result<(), GitError> {
        let files = {
            let mut state = self.inner.lock();
            state.calls.push(GitCall {
                url: url.to_string(),
                revision: revision.map(str::to_string),
                dest: dest.to_path_buf(),
            });
            let forced = match state.failures.get_mut(url) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            };
            if forced {
                None
            } else {
                state.repos.get(url).cloned()
            }
        };

        let fail = |message: &str| GitError::CloneFailed {
            url: url.to_string(),
            message: message.to_string(),
        };
        let Some(files) = files else {
            let _ = std::fs::write(dest.join(".git-partial"), "partial");
            return Err(fail("could not resolve host"));
        };
        for (path, content) in files {
            let path = dest.join(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| fail(&e.to_string()))?;
            }
            std::fs::write(&path, content).map_err(|e| fail(&e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
