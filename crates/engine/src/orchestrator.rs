// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maintenance-gated orchestrator actions.
//!
//! Each action consults the gate exactly once, before starting. While
//! maintenance is enabled the action is deferred and the pod adapter is
//! never called; an action that passed the gate runs to completion even if
//! maintenance is enabled meanwhile.

use crate::error::{OrchestratorError, PodError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use wsd_core::{ContentSourceSpec, MaintenanceGate, WorkspaceId};

/// Reason reported for deferred actions.
pub const DEFERRED_REASON: &str = "under maintenance";

/// Pod lifecycle operations behind the gate
#[async_trait]
pub trait PodAdapter: Clone + Send + Sync + 'static {
    async fn create(&self, spec: ContentSourceSpec) -> Result<(), PodError>;

    async fn delete(&self, id: &WorkspaceId) -> Result<(), PodError>;

    /// Returns the content-addressed snapshot id.
    async fn snapshot(&self, id: &WorkspaceId) -> Result<String, PodError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutput {
    Created,
    Deleted,
    Snapshot(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Done(ActionOutput),
    /// Not started; retry once maintenance is disabled
    Deferred,
}

pub struct Orchestrator<P, G> {
    pods: P,
    gate: G,
}

impl<P: PodAdapter, G: MaintenanceGate> Orchestrator<P, G> {
    pub fn new(pods: P, gate: G) -> Self {
        Self { pods, gate }
    }

    pub fn pods(&self) -> &P {
        &self.pods
    }

    pub async fn create_pod(
        &self,
        spec: ContentSourceSpec,
        ctx: &CancellationToken,
    ) -> Result<ActionStatus, OrchestratorError> {
        let span = tracing::info_span!("orchestrator.create_pod", workspace_id = %spec.workspace_id);
        async {
            if self.deferred(ctx)? {
                return Ok(ActionStatus::Deferred);
            }
            self.pods.create(spec).await?;
            Ok(ActionStatus::Done(ActionOutput::Created))
        }
        .instrument(span)
        .await
    }

    pub async fn delete_pod(
        &self,
        id: &WorkspaceId,
        ctx: &CancellationToken,
    ) -> Result<ActionStatus, OrchestratorError> {
        let span = tracing::info_span!("orchestrator.delete_pod", workspace_id = %id);
        async {
            if self.deferred(ctx)? {
                return Ok(ActionStatus::Deferred);
            }
            self.pods.delete(id).await?;
            Ok(ActionStatus::Done(ActionOutput::Deleted))
        }
        .instrument(span)
        .await
    }

    pub async fn snapshot(
        &self,
        id: &WorkspaceId,
        ctx: &CancellationToken,
    ) -> Result<ActionStatus, OrchestratorError> {
        let span = tracing::info_span!("orchestrator.snapshot", workspace_id = %id);
        async {
            if self.deferred(ctx)? {
                return Ok(ActionStatus::Deferred);
            }
            let snapshot = self.pods.snapshot(id).await?;
            tracing::info!(snapshot = %snapshot, "snapshot taken");
            Ok(ActionStatus::Done(ActionOutput::Snapshot(snapshot)))
        }
        .instrument(span)
        .await
    }

    fn deferred(&self, ctx: &CancellationToken) -> Result<bool, OrchestratorError> {
        let enabled = self.gate.is_enabled(ctx)?;
        if enabled {
            tracing::info!("deferred: {DEFERRED_REASON}");
        }
        Ok(enabled)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePodAdapter, PodCall};

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
