// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blob storage for backups, prebuild layers and snapshots

mod fs;

pub use fs::FsBlobStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod memory;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryBlobStore;

use std::io::Read;
use thiserror::Error;

/// Errors from blob storage
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),
    #[error("blob {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl BlobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobError::NotFound(_))
    }
}

/// Keyed store of immutable archives.
///
/// Reads are streaming; the content initializer never buffers a whole
/// archive in memory.
pub trait BlobStore: Clone + Send + Sync + 'static {
    /// Open a blob for reading.
    fn open(&self, key: &str) -> Result<Box<dyn Read + Send>, BlobError>;

    /// Store a blob, replacing any previous one with the same key.
    /// Returns the number of bytes written.
    fn put(&self, key: &str, data: &mut dyn Read) -> Result<u64, BlobError>;

    fn exists(&self, key: &str) -> bool;
}
