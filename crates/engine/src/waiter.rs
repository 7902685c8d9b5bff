// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor-side readiness waiter.
//!
//! Blocks until the workspace's readiness message arrives, or gives up after
//! a timeout and reports a degraded start instead of hanging.

use crate::error::WaitError;
use crate::publish::ReadySubscription;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wsd_adapters::ready_file::read_ready_file;
use wsd_core::WorkspaceReadyMessage;

/// Default interval between ready-file checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where a waiter learns about readiness.
#[async_trait]
pub trait ReadySource: Send {
    /// Resolve once readiness is known.
    async fn ready(&mut self) -> Result<Arc<WorkspaceReadyMessage>, WaitError>;
}

/// In-process source backed by a publisher subscription.
pub struct SubscriptionSource {
    sub: ReadySubscription,
}

impl SubscriptionSource {
    pub fn new(sub: ReadySubscription) -> Self {
        Self { sub }
    }
}

#[async_trait]
impl ReadySource for SubscriptionSource {
    async fn ready(&mut self) -> Result<Arc<WorkspaceReadyMessage>, WaitError> {
        self.sub.wait().await.ok_or(WaitError::Closed)
    }
}

/// Polls `<target>/.workspace/ready`.
///
/// A missing file means "not yet"; an unparsable one is an error.
pub struct ReadyFileSource {
    target: PathBuf,
    interval: Duration,
}

impl ReadyFileSource {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            interval: crate::env::ready_poll_interval().unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[async_trait]
impl ReadySource for ReadyFileSource {
    async fn ready(&mut self) -> Result<Arc<WorkspaceReadyMessage>, WaitError> {
        loop {
            if let Some(msg) = read_ready_file(&self.target)? {
                return Ok(Arc::new(msg));
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// Result of waiting for readiness
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitResult {
    Ready(Arc<WorkspaceReadyMessage>),
    /// No signal within the timeout; the caller proceeds without content
    /// guarantees.
    Degraded,
}

/// Waits on a [`ReadySource`] with a deadline
pub struct ReadinessWaiter<S> {
    source: S,
}

impl<S: ReadySource> ReadinessWaiter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn wait(&mut self, timeout: Duration) -> Result<WaitResult, WaitError> {
        let start = Instant::now();
        match tokio::time::timeout(timeout, self.source.ready()).await {
            Ok(Ok(msg)) => {
                tracing::info!(
                    workspace_id = %msg.workspace_id,
                    succeeded = msg.succeeded(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "workspace content ready"
                );
                Ok(WaitResult::Ready(msg))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "no readiness signal before timeout, continuing degraded"
                );
                Ok(WaitResult::Degraded)
            }
        }
    }
}

#[cfg(test)]
#[path = "waiter_tests.rs"]
mod tests;
