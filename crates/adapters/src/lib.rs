// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: git, blob storage, archives, content sources

pub mod archive;
pub mod blob;
pub mod content;
mod env;
pub mod git;
pub mod ready_file;
pub mod subprocess;
pub mod traced;

pub use archive::ArchiveError;
pub use blob::{BlobError, BlobStore, FsBlobStore};
pub use content::{populate, ContentDeps, ContentError};
pub use git::{CliGit, GitAdapter, GitError};
pub use ready_file::ReadyFileError;
pub use traced::{TracedBlobStore, TracedGit};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use blob::MemoryBlobStore;
#[cfg(any(test, feature = "test-support"))]
pub use git::{FakeGit, GitCall};
