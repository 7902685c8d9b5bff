// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use serde::{Deserialize, Serialize};
use wsd_core::{ContentSourceSpec, WorkspaceId, WorkspaceReadyMessage, WorkspaceStatus};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    call, decode, encode, read_message, read_request, write_message, write_response,
    ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE,
};

/// Request from a client to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Create the workspace pod and start content initialization
    Init { spec: ContentSourceSpec },

    /// Cancel initialization and remove the workspace
    Delete { id: WorkspaceId },

    /// Archive a ready workspace into the blob store
    Snapshot { id: WorkspaceId },

    /// Current status of one workspace
    Status { id: WorkspaceId },

    /// Block until the workspace publishes readiness or the timeout elapses
    WaitReady { id: WorkspaceId, timeout_ms: u64 },

    /// Administrative maintenance toggle
    SetMaintenance { enabled: bool },

    /// Request daemon shutdown
    Shutdown,
}

/// Response from daemon to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,

    /// Initialization started
    Accepted,

    /// Action not started because maintenance is enabled
    Deferred { reason: String },

    Snapshot { id: String },

    Status { status: WorkspaceStatus },

    Ready { message: WorkspaceReadyMessage },

    /// Wait timed out before readiness was published
    NotReady,

    Ok,

    Error { message: String },
}

impl Response {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Response::Error {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
