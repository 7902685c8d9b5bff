// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake pod adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::PodAdapter;
use crate::error::PodError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;
use wsd_core::{ContentSourceSpec, WorkspaceId};

/// Recorded pod adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodCall {
    Create(WorkspaceId),
    Delete(WorkspaceId),
    Snapshot(WorkspaceId),
}

#[derive(Default)]
struct FakePodState {
    calls: Vec<PodCall>,
    hold: bool,
}

/// Records calls; can hold actions mid-flight until released.
#[derive(Clone, Default)]
pub struct FakePodAdapter {
    inner: Arc<Mutex<FakePodState>>,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl FakePodAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PodCall> {
        self.inner.lock().calls.clone()
    }

    /// Make subsequent calls block after recording until [`release`](Self::release).
    pub fn hold(&self) {
        self.inner.lock().hold = true;
    }

    /// Wait until a held call has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.inner.lock().hold = false;
        self.release.notify_waiters();
    }

    async fn record(&self, call: PodCall) {
        let hold = {
            let mut state = self.inner.lock();
            state.calls.push(call);
            state.hold
        };
        if hold {
            let released = self.release.notified();
            self.entered.notify_one();
            released.await;
        }
    }
}

#[async_trait]
impl PodAdapter for FakePodAdapter {
    async fn create(&self, spec: ContentSourceSpec) -> Result<(), PodError> {
        self.record(PodCall::Create(spec.workspace_id)).await;
        Ok(())
    }

    async fn delete(&self, id: &WorkspaceId) -> Result<(), PodError> {
        self.record(PodCall::Delete(id.clone())).await;
        Ok(())
    }

    async fn snapshot(&self, id: &WorkspaceId) -> Result<String, PodError> {
        self.record(PodCall::Snapshot(id.clone())).await;
        Ok(format!("sha256:{}", "ab".repeat(32)))
    }
}
