// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git adapters

mod cli;

pub use cli::CliGit;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeGit, GitCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("clone of {url} failed: {message}")]
    CloneFailed { url: String, message: String },
    #[error("checkout of {revision} failed: {message}")]
    CheckoutFailed { revision: String, message: String },
}

/// Adapter for fetching repositories
#[async_trait]
pub trait GitAdapter: Clone + Send + Sync + 'static {
    /// Clone `url` into `dest` (an existing, empty directory) and check out
    /// `revision` if given.
    async fn clone_repo(
        &self,
        url: &str,
        revision: Option<&str>,
        dest: &Path,
    ) -> Result<(), GitError>;
}
