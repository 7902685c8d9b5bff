// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node agent: owns one initialization task per workspace.
//!
//! `start` registers a publisher and spawns the initialization; the task
//! records per-attempt status, then publishes the final outcome. Status is
//! updated before publishing so a woken waiter observes a terminal state.

use crate::error::AgentError;
use crate::publish::{ReadinessPublisher, ReadyFileSink, ReadySink, ReadySubscription};
use crate::registry::ReadinessRegistry;
use crate::runner::ChildRunner;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use wsd_core::{
    ContentSourceSpec, FailureCode, IdGen, InitOutcome, InstanceId, UuidIdGen, WorkspaceId,
    WorkspaceStatus,
};

/// Produces the final outcome of one workspace's content initialization.
#[async_trait]
pub trait ContentInitializer: Send + Sync + 'static {
    async fn initialize(
        &self,
        spec: &ContentSourceSpec,
        cancel: &CancellationToken,
        on_attempt: &(dyn Fn(u32) + Send + Sync),
    ) -> InitOutcome;
}

#[async_trait]
impl ContentInitializer for ChildRunner {
    async fn initialize(
        &self,
        spec: &ContentSourceSpec,
        cancel: &CancellationToken,
        on_attempt: &(dyn Fn(u32) + Send + Sync),
    ) -> InitOutcome {
        self.run_with(spec, cancel, on_attempt).await
    }
}

struct Entry {
    instance: InstanceId,
    spec: ContentSourceSpec,
    status: WorkspaceStatus,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

struct AgentInner<I, G> {
    initializer: I,
    ids: G,
    registry: ReadinessRegistry,
    entries: Mutex<HashMap<WorkspaceId, Entry>>,
    shutdown: CancellationToken,
    ready_file: bool,
}

/// Node-level owner of workspace initializations
pub struct NodeAgent<I, G = UuidIdGen> {
    inner: Arc<AgentInner<I, G>>,
}

impl<I, G> Clone for NodeAgent<I, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: ContentInitializer> NodeAgent<I, UuidIdGen> {
    pub fn new(initializer: I) -> Self {
        Self::with_id_gen(initializer, UuidIdGen)
    }
}

impl<I: ContentInitializer, G: IdGen> NodeAgent<I, G> {
    pub fn with_id_gen(initializer: I, ids: G) -> Self {
        Self::build(initializer, ids, true)
    }

    /// Agent that does not write `<target>/.workspace/ready`; readiness is
    /// only observable through subscriptions.
    pub fn without_ready_file(initializer: I, ids: G) -> Self {
        Self::build(initializer, ids, false)
    }

    fn build(initializer: I, ids: G, ready_file: bool) -> Self {
        Self {
            inner: Arc::new(AgentInner {
                initializer,
                ids,
                registry: ReadinessRegistry::new(),
                entries: Mutex::new(HashMap::new()),
                shutdown: CancellationToken::new(),
                ready_file,
            }),
        }
    }

    pub fn registry(&self) -> &ReadinessRegistry {
        &self.inner.registry
    }

    /// Begin initializing a workspace.
    ///
    /// Rejected while the same workspace, or another active workspace with
    /// the same target path, is still initializing. A terminal workspace is
    /// replaced by a new instance.
    pub fn start(&self, spec: ContentSourceSpec) -> Result<InstanceId, AgentError> {
        spec.validate()?;
        let id = spec.workspace_id.clone();

        let mut entries = self.inner.entries.lock();
        if let Some(entry) = entries.get(&id) {
            if !entry.status.is_terminal() {
                return Err(AgentError::AlreadyRunning(id));
            }
        }
        if let Some((owner, _)) = entries.iter().find(|(other, e)| {
            **other != id && !e.status.is_terminal() && e.spec.target_path == spec.target_path
        }) {
            return Err(AgentError::TargetInUse {
                path: spec.target_path.clone(),
                owner: owner.clone(),
            });
        }

        let mut sinks: Vec<Arc<dyn ReadySink>> = Vec::new();
        if self.inner.ready_file {
            sinks.push(Arc::new(ReadyFileSink::new(&spec.target_path)));
        }
        let publisher = self.inner.registry.replace(&id, sinks);
        let instance = InstanceId::new(self.inner.ids.next());
        let cancel = self.inner.shutdown.child_token();

        tracing::info!(
            workspace_id = %id,
            instance_id = %instance,
            kind = %spec.kind(),
            target = %spec.target_path.display(),
            "starting content initialization"
        );

        let span = tracing::info_span!("workspace.init", workspace_id = %id, instance_id = %instance);
        let task = tokio::spawn(
            self.clone()
                .initialize(spec.clone(), instance.clone(), cancel.clone(), publisher)
                .instrument(span),
        );
        entries.insert(
            id,
            Entry {
                instance: instance.clone(),
                spec,
                status: WorkspaceStatus::Pending,
                cancel,
                task: Some(task),
            },
        );
        Ok(instance)
    }

    async fn initialize(
        self,
        spec: ContentSourceSpec,
        instance: InstanceId,
        cancel: CancellationToken,
        publisher: Arc<ReadinessPublisher>,
    ) {
        let id = spec.workspace_id.clone();
        let on_attempt = |attempt: u32| {
            self.set_status(&id, &instance, WorkspaceStatus::Initializing { attempt });
        };
        let outcome = self
            .inner
            .initializer
            .initialize(&spec, &cancel, &on_attempt)
            .await;

        let status = match outcome.failure_code() {
            None => WorkspaceStatus::Ready,
            Some(FailureCode::Canceled) => WorkspaceStatus::Canceled,
            Some(code) => WorkspaceStatus::Failed { code },
        };
        self.set_status(&id, &instance, status);

        match publisher.publish(&outcome).await {
            Ok(_) => tracing::info!(
                attempts = outcome.attempts,
                bytes = outcome.bytes_written,
                elapsed_ms = outcome.duration.as_millis() as u64,
                "content initialization concluded"
            ),
            Err(e) => tracing::error!(error = %e, "failed to publish readiness"),
        }
    }

    fn set_status(&self, id: &WorkspaceId, instance: &InstanceId, status: WorkspaceStatus) {
        let mut entries = self.inner.entries.lock();
        // A forgotten or restarted workspace no longer belongs to this task
        if let Some(entry) = entries.get_mut(id).filter(|e| &e.instance == instance) {
            tracing::debug!(workspace_id = %id, from = %entry.status, to = %status, "status");
            entry.status = status;
        }
    }

    /// Cancel an in-flight initialization. The task kills the child and
    /// publishes `canceled`; canceling a terminal workspace is a no-op.
    pub fn cancel(&self, id: &WorkspaceId) -> Result<(), AgentError> {
        let entries = self.inner.entries.lock();
        let entry = entries
            .get(id)
            .ok_or_else(|| AgentError::NotFound(id.clone()))?;
        if !entry.status.is_terminal() {
            tracing::info!(workspace_id = %id, "canceling content initialization");
            entry.cancel.cancel();
        }
        Ok(())
    }

    pub fn status(&self, id: &WorkspaceId) -> Option<WorkspaceStatus> {
        self.inner.entries.lock().get(id).map(|e| e.status.clone())
    }

    pub fn instance(&self, id: &WorkspaceId) -> Option<InstanceId> {
        self.inner.entries.lock().get(id).map(|e| e.instance.clone())
    }

    pub fn target(&self, id: &WorkspaceId) -> Option<PathBuf> {
        self.inner
            .entries
            .lock()
            .get(id)
            .map(|e| e.spec.target_path.clone())
    }

    /// All known workspaces, sorted by id.
    pub fn list(&self) -> Vec<(WorkspaceId, WorkspaceStatus)> {
        let mut all: Vec<_> = self
            .inner
            .entries
            .lock()
            .iter()
            .map(|(id, e)| (id.clone(), e.status.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn subscribe(&self, id: &WorkspaceId) -> Option<ReadySubscription> {
        self.inner.registry.subscribe(id)
    }

    /// Drop a terminal workspace and its publisher.
    ///
    /// Returns `false` if the workspace is unknown.
    pub fn forget(&self, id: &WorkspaceId) -> Result<bool, AgentError> {
        let mut entries = self.inner.entries.lock();
        match entries.get(id) {
            None => Ok(false),
            Some(entry) if !entry.status.is_terminal() => {
                Err(AgentError::AlreadyRunning(id.clone()))
            }
            Some(_) => {
                entries.remove(id);
                self.inner.registry.remove(id);
                Ok(true)
            }
        }
    }

    /// Cancel every in-flight initialization and wait for the tasks to
    /// publish.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let tasks: Vec<JoinHandle<()>> = self
            .inner
            .entries
            .lock()
            .values_mut()
            .filter_map(|e| e.task.take())
            .collect();
        tracing::info!(tasks = tasks.len(), "waiting for initializations to stop");
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "initialization task failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
