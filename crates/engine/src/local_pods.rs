// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod adapter backed by the node agent and a blob store.
//!
//! A "pod" here is the workspace directory on this node: create starts
//! content initialization, delete tears it down, and snapshot archives a
//! ready workspace into the blob store under its content digest.

use crate::agent::{ContentInitializer, NodeAgent};
use crate::error::{AgentError, PodError};
use crate::orchestrator::PodAdapter;
use async_trait::async_trait;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;
use wsd_adapters::archive::{pack_dir, HashingWriter};
use wsd_adapters::BlobStore;
use wsd_core::{ContentSourceSpec, IdGen, WorkspaceId, WorkspaceStatus};

/// How long delete waits for a canceled initialization to publish.
const DELETE_GRACE: Duration = Duration::from_secs(30);

pub struct LocalPods<I, G, B> {
    agent: NodeAgent<I, G>,
    blobs: B,
    delete_grace: Duration,
}

impl<I, G, B: Clone> Clone for LocalPods<I, G, B> {
    fn clone(&self) -> Self {
        Self {
            agent: self.agent.clone(),
            blobs: self.blobs.clone(),
            delete_grace: self.delete_grace,
        }
    }
}

impl<I: ContentInitializer, G: IdGen, B: BlobStore> LocalPods<I, G, B> {
    pub fn new(agent: NodeAgent<I, G>, blobs: B) -> Self {
        Self {
            agent,
            blobs,
            delete_grace: DELETE_GRACE,
        }
    }

    pub fn with_delete_grace(mut self, grace: Duration) -> Self {
        self.delete_grace = grace;
        self
    }

    pub fn agent(&self) -> &NodeAgent<I, G> {
        &self.agent
    }
}

#[async_trait]
impl<I: ContentInitializer, G: IdGen, B: BlobStore> PodAdapter for LocalPods<I, G, B> {
    async fn create(&self, spec: ContentSourceSpec) -> Result<(), PodError> {
        self.agent.start(spec)?;
        Ok(())
    }

    async fn delete(&self, id: &WorkspaceId) -> Result<(), PodError> {
        let target = self
            .agent
            .target(id)
            .ok_or_else(|| AgentError::NotFound(id.clone()))?;

        self.agent.cancel(id)?;
        if let Some(mut sub) = self.agent.subscribe(id) {
            // The child may still be writing; leave the tree alone
            if sub.wait_timeout(self.delete_grace).await.is_none() {
                tracing::warn!(
                    workspace_id = %id,
                    grace_ms = self.delete_grace.as_millis() as u64,
                    "initialization did not stop in time, delete aborted"
                );
                return Err(PodError::StopTimeout {
                    id: id.clone(),
                    grace: self.delete_grace,
                });
            }
        }

        tokio::task::spawn_blocking(move || remove_tree(&target))
            .await
            .map_err(|e| PodError::Join(e.to_string()))??;
        self.agent.forget(id)?;
        tracing::info!(workspace_id = %id, "workspace deleted");
        Ok(())
    }

    async fn snapshot(&self, id: &WorkspaceId) -> Result<String, PodError> {
        match self.agent.status(id) {
            Some(WorkspaceStatus::Ready) => {}
            Some(_) => return Err(PodError::NotReady(id.clone())),
            None => return Err(AgentError::NotFound(id.clone()).into()),
        }
        let target = self
            .agent
            .target(id)
            .ok_or_else(|| AgentError::NotFound(id.clone()))?;
        let blobs = self.blobs.clone();

        tokio::task::spawn_blocking(move || archive_to_store(&target, &blobs))
            .await
            .map_err(|e| PodError::Join(e.to_string()))?
    }
}

fn remove_tree(target: &Path) -> Result<(), PodError> {
    match std::fs::remove_dir_all(target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Pack `target` into a spool file, then store it under its digest.
fn archive_to_store<B: BlobStore>(target: &Path, blobs: &B) -> Result<String, PodError> {
    let spool = tempfile::tempfile()?;
    let (mut spool, digest) = pack_dir(target, HashingWriter::new(spool))?.finish();
    spool.seek(SeekFrom::Start(0))?;
    let bytes = blobs.put(&digest, &mut spool)?;
    tracing::info!(snapshot = %digest, bytes, "snapshot stored");
    Ok(digest)
}

#[cfg(test)]
#[path = "local_pods_tests.rs"]
mod tests;
