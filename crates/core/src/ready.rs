// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace readiness message.
//!
//! This is the wire contract shared with the in-workspace supervisor and
//! external status clients. Field names are fixed; any change here must be
//! mirrored in the generated client type.

use crate::outcome::{FailureReason, InitOutcome};
use crate::workspace::WorkspaceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome as seen on the wire (telemetry fields are dropped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyOutcome {
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
}

/// One-shot terminal signal for a workspace instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceReadyMessage {
    #[serde(rename = "workspaceID")]
    pub workspace_id: WorkspaceId,
    pub outcome: ReadyOutcome,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl WorkspaceReadyMessage {
    pub fn new(workspace_id: WorkspaceId, outcome: &InitOutcome) -> Self {
        Self {
            workspace_id,
            outcome: ReadyOutcome {
                succeeded: outcome.succeeded(),
                failure_reason: outcome.failure.clone(),
            },
            metadata: outcome.metadata.clone(),
        }
    }

    /// Message for a workspace deleted before initialization concluded.
    pub fn canceled(workspace_id: WorkspaceId) -> Self {
        Self::new(workspace_id, &InitOutcome::canceled())
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.succeeded
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "ready_tests.rs"]
mod tests;
