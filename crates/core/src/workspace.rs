// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace identifiers and initialization status.
//!
//! A WorkspaceId is stable for the lifetime of the workspace. Every time the
//! node agent starts initializing it, a fresh InstanceId is minted; readiness
//! is published at most once per instance.

use crate::outcome::FailureCode;
use serde::{Deserialize, Serialize};
use std::fmt;

crate::string_id! {
    /// Unique identifier for a workspace, stable for its lifetime.
    pub struct WorkspaceId;

    /// Identifier of one initialization run of a workspace.
    pub struct InstanceId;
}

/// Status of a workspace's content initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkspaceStatus {
    /// Accepted, child not spawned yet
    #[default]
    Pending,
    /// A child is populating the target path
    Initializing {
        /// 1-based attempt counter
        attempt: u32,
    },
    /// Content is in place and readiness was published
    Ready,
    /// Initialization failed; readiness(failed) was published
    Failed { code: FailureCode },
    /// Workspace was deleted mid-initialization
    Canceled,
}

impl WorkspaceStatus {
    /// Terminal states never transition again for the same instance.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkspaceStatus::Ready | WorkspaceStatus::Failed { .. } | WorkspaceStatus::Canceled
        )
    }
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceStatus::Pending => write!(f, "pending"),
            WorkspaceStatus::Initializing { attempt } => write!(f, "initializing({})", attempt),
            WorkspaceStatus::Ready => write!(f, "ready"),
            WorkspaceStatus::Failed { code } => write!(f, "failed({})", code),
            WorkspaceStatus::Canceled => write!(f, "canceled"),
        }
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
