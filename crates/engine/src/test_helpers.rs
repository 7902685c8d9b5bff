// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::agent::ContentInitializer;
use crate::error::SinkError;
use crate::publish::ReadySink;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use wsd_core::{ContentSourceSpec, InitOutcome, WorkspaceId, WorkspaceReadyMessage};

/// Sink recording every delivery into a shared log as `(sink name, message)`.
pub(crate) struct RecordingSink {
    name: String,
    log: Arc<Mutex<Vec<(String, WorkspaceReadyMessage)>>>,
}

impl RecordingSink {
    pub(crate) fn new(
        name: &str,
        log: &Arc<Mutex<Vec<(String, WorkspaceReadyMessage)>>>,
    ) -> Arc<dyn ReadySink> {
        Arc::new(Self {
            name: name.to_string(),
            log: Arc::clone(log),
        })
    }
}

#[async_trait]
impl ReadySink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, msg: &WorkspaceReadyMessage) -> Result<(), SinkError> {
        self.log.lock().push((self.name.clone(), msg.clone()));
        Ok(())
    }
}

/// Sink that always fails.
pub(crate) struct FailingSink;

#[async_trait]
impl ReadySink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn deliver(&self, _msg: &WorkspaceReadyMessage) -> Result<(), SinkError> {
        Err(SinkError::Join("sink exploded".to_string()))
    }
}

#[derive(Default)]
struct FakeInitState {
    outcomes: HashMap<WorkspaceId, InitOutcome>,
    hanging: HashSet<WorkspaceId>,
    stalled: HashMap<WorkspaceId, Arc<Notify>>,
    calls: Vec<WorkspaceId>,
}

/// Initializer with scripted outcomes; unscripted workspaces succeed.
///
/// Hanging workspaces block until canceled and then report `canceled`,
/// like a killed child. Stalled ones ignore cancellation until released.
#[derive(Clone, Default)]
pub(crate) struct FakeInitializer {
    inner: Arc<Mutex<FakeInitState>>,
}

impl FakeInitializer {
    pub(crate) fn set_outcome(&self, id: &str, outcome: InitOutcome) {
        self.inner.lock().outcomes.insert(WorkspaceId::new(id), outcome);
    }

    pub(crate) fn hang(&self, id: &str) {
        self.inner.lock().hanging.insert(WorkspaceId::new(id));
    }

    /// Block `id` until the returned handle is notified.
    pub(crate) fn stall(&self, id: &str) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        self.inner
            .lock()
            .stalled
            .insert(WorkspaceId::new(id), Arc::clone(&release));
        release
    }

    pub(crate) fn calls(&self) -> Vec<WorkspaceId> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl ContentInitializer for FakeInitializer {
    async fn initialize(
        &self,
        spec: &ContentSourceSpec,
        cancel: &CancellationToken,
        on_attempt: &(dyn Fn(u32) + Send + Sync),
    ) -> InitOutcome {
        on_attempt(1);
        let (hanging, stalled, scripted) = {
            let mut state = self.inner.lock();
            state.calls.push(spec.workspace_id.clone());
            (
                state.hanging.contains(&spec.workspace_id),
                state.stalled.get(&spec.workspace_id).cloned(),
                state.outcomes.get(&spec.workspace_id).cloned(),
            )
        };
        if let Some(release) = stalled {
            release.notified().await;
            return InitOutcome::canceled();
        }
        if hanging {
            cancel.cancelled().await;
            return InitOutcome::canceled();
        }
        let mut outcome = scripted.unwrap_or_else(|| InitOutcome::success(0));
        outcome.attempts = 1;
        outcome
    }
}
