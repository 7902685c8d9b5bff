// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness publisher.
//!
//! A single-assignment cell per workspace instance. The first publish fixes
//! the message; later subscribers receive the cached copy, identical
//! re-publishes are retransmissions, and a different payload is rejected.
//! Sinks see the message before subscribers are woken.

use crate::error::{PublishError, SinkError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wsd_core::{InitOutcome, WorkspaceId, WorkspaceReadyMessage};

type Slot = Option<Arc<WorkspaceReadyMessage>>;

/// Destination that receives the readiness message once.
#[async_trait]
pub trait ReadySink: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn deliver(&self, msg: &WorkspaceReadyMessage) -> Result<(), SinkError>;
}

/// Writes the message to the ready file inside the workspace.
#[derive(Debug, Clone)]
pub struct ReadyFileSink {
    target: PathBuf,
}

impl ReadyFileSink {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl ReadySink for ReadyFileSink {
    fn name(&self) -> &str {
        "ready-file"
    }

    async fn deliver(&self, msg: &WorkspaceReadyMessage) -> Result<(), SinkError> {
        let target = self.target.clone();
        let msg = msg.clone();
        tokio::task::spawn_blocking(move || wsd_adapters::ready_file::write_ready_file(&target, &msg))
            .await
            .map_err(|e| SinkError::Join(e.to_string()))??;
        Ok(())
    }
}

/// One-shot readiness signal for one workspace instance
pub struct ReadinessPublisher {
    workspace_id: WorkspaceId,
    tx: watch::Sender<Slot>,
    state: Mutex<PublisherState>,
}

struct PublisherState {
    /// Set by the first publish, before sinks run and subscribers wake
    claimed: Slot,
    sinks: Vec<Arc<dyn ReadySink>>,
}

impl ReadinessPublisher {
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self::with_sinks(workspace_id, Vec::new())
    }

    pub fn with_sinks(workspace_id: WorkspaceId, sinks: Vec<Arc<dyn ReadySink>>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            workspace_id,
            tx,
            state: Mutex::new(PublisherState {
                claimed: None,
                sinks,
            }),
        }
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Publish the final outcome.
    ///
    /// On the first publish, sinks are delivered in registration order and
    /// only then are subscribers woken, so a woken subscriber never races a
    /// sink still writing. A failing sink is logged and does not affect the
    /// result.
    pub async fn publish(
        &self,
        outcome: &InitOutcome,
    ) -> Result<Arc<WorkspaceReadyMessage>, PublishError> {
        let msg = Arc::new(WorkspaceReadyMessage::new(
            self.workspace_id.clone(),
            outcome,
        ));

        let sinks = {
            let mut state = self.state.lock();
            if let Some(current) = &state.claimed {
                if **current == *msg {
                    tracing::debug!(workspace_id = %self.workspace_id, "identical readiness re-published");
                    return Ok(Arc::clone(current));
                }
                tracing::error!(
                    workspace_id = %self.workspace_id,
                    "conflicting readiness publish rejected"
                );
                return Err(PublishError::Conflict(self.workspace_id.clone()));
            }
            state.claimed = Some(Arc::clone(&msg));
            state.sinks.clone()
        };

        for sink in sinks {
            deliver(sink.as_ref(), &msg).await;
        }
        self.tx.send_replace(Some(Arc::clone(&msg)));
        tracing::info!(
            workspace_id = %self.workspace_id,
            succeeded = msg.succeeded(),
            code = ?outcome.failure_code(),
            "readiness published"
        );
        Ok(msg)
    }

    /// Register a sink; it receives the message immediately if already
    /// published.
    pub async fn add_sink(&self, sink: Arc<dyn ReadySink>) {
        let published = {
            let mut state = self.state.lock();
            match &state.claimed {
                Some(msg) => Arc::clone(msg),
                None => {
                    state.sinks.push(sink);
                    return;
                }
            }
        };
        deliver(sink.as_ref(), &published).await;
    }

    pub fn subscribe(&self) -> ReadySubscription {
        ReadySubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> Option<Arc<WorkspaceReadyMessage>> {
        self.tx.borrow().clone()
    }

    pub fn is_published(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

async fn deliver(sink: &dyn ReadySink, msg: &WorkspaceReadyMessage) {
    if let Err(e) = sink.deliver(msg).await {
        tracing::warn!(
            workspace_id = %msg.workspace_id,
            sink = sink.name(),
            error = %e,
            "readiness sink failed"
        );
    }
}

/// Receiver side of a publisher
#[derive(Clone)]
pub struct ReadySubscription {
    rx: watch::Receiver<Slot>,
}

impl ReadySubscription {
    /// Resolve once published (immediately if already published).
    ///
    /// Returns `None` if the publisher is dropped without publishing.
    pub async fn wait(&mut self) -> Option<Arc<WorkspaceReadyMessage>> {
        let published = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map(|slot| slot.clone());
        match published {
            Ok(msg) => msg,
            // Sender dropped; it may still have published before going away
            Err(_) => self.rx.borrow().clone(),
        }
    }

    pub async fn wait_timeout(&mut self, timeout: Duration) -> Option<Arc<WorkspaceReadyMessage>> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .ok()
            .flatten()
    }

    pub fn current(&self) -> Option<Arc<WorkspaceReadyMessage>> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
#[path = "publish_tests.rs"]
mod tests;
