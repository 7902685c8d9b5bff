// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::blob::{BlobError, BlobStore};
use crate::git::{GitAdapter, GitError};
use async_trait::async_trait;
use std::io::Read;
use std::path::Path;
use tracing::Instrument;

/// Wrapper that adds tracing to any GitAdapter
#[derive(Clone)]
pub struct TracedGit<G> {
    inner: G,
}

impl<G> TracedGit<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: GitAdapter> GitAdapter for TracedGit<G> {
    async fn clone_repo(
        &self,
        url: &str,
        revision: Option<&str>,
        dest: &Path,
    ) -> Result<(), GitError> {
        async {
            tracing::info!(revision, "cloning");
            let start = std::time::Instant::now();
            let result = self.inner.clone_repo(url, revision, dest).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "clone finished"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "clone failed"),
            }
            result
        }
        .instrument(tracing::info_span!("git.clone", url, dest = %dest.display()))
        .await
    }
}

/// Wrapper that adds tracing to any BlobStore
#[derive(Clone)]
pub struct TracedBlobStore<B> {
    inner: B,
}

impl<B> TracedBlobStore<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

impl<B: BlobStore> BlobStore for TracedBlobStore<B> {
    fn open(&self, key: &str) -> Result<Box<dyn Read + Send>, BlobError> {
        let result = self.inner.open(key);
        tracing::info_span!("blob.open", key).in_scope(|| match &result {
            Ok(_) => tracing::info!("opened"),
            Err(e) if e.is_not_found() => tracing::warn!("not found"),
            Err(e) => tracing::error!(error = %e, "open failed"),
        });
        result
    }

    fn put(&self, key: &str, data: &mut dyn Read) -> Result<u64, BlobError> {
        let span = tracing::info_span!("blob.put", key);
        let _guard = span.enter();
        let start = std::time::Instant::now();
        let result = self.inner.put(key, data);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(bytes) => tracing::info!(bytes, elapsed_ms, "stored"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "put failed"),
        }
        result
    }

    fn exists(&self, key: &str) -> bool {
        let exists = self.inner.exists(key);
        tracing::trace!(key, exists, "checked");
        exists
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
