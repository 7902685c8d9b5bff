// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;
use wsd_adapters::{ArchiveError, BlobError, ReadyFileError};
use wsd_core::{MaintenanceError, SpecError, WorkspaceId};

/// Errors from publishing a readiness message
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("workspace {0} already published a different outcome")]
    Conflict(WorkspaceId),
}

/// Errors from delivering a readiness message to a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    ReadyFile(#[from] ReadyFileError),
    #[error("sink task failed: {0}")]
    Join(String),
}

/// Errors from waiting for readiness
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("publisher went away before signaling readiness")]
    Closed,
    #[error(transparent)]
    ReadyFile(#[from] ReadyFileError),
}

/// Errors from the node agent
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid spec: {0}")]
    InvalidSpec(#[from] SpecError),
    #[error("workspace {0} is already initializing")]
    AlreadyRunning(WorkspaceId),
    #[error("target {path} is owned by workspace {owner}")]
    TargetInUse {
        path: std::path::PathBuf,
        owner: WorkspaceId,
    },
    #[error("workspace not found: {0}")]
    NotFound(WorkspaceId),
}

/// Errors from pod lifecycle adapters
#[derive(Debug, Error)]
pub enum PodError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("workspace {0} is not ready")]
    NotReady(WorkspaceId),
    #[error("workspace {id} did not stop within {grace:?}")]
    StopTimeout {
        id: WorkspaceId,
        grace: std::time::Duration,
    },
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("snapshot i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("background task failed: {0}")]
    Join(String),
}

/// Errors from orchestrator actions
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Maintenance(#[from] MaintenanceError),
    #[error(transparent)]
    Pod(#[from] PodError),
}
