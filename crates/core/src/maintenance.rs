// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster maintenance gate.
//!
//! Orchestrator actions that create or delete a pod, or take a snapshot,
//! consult the gate once before starting. The gate only blocks the start of
//! new actions; it never queues work and never aborts an action in flight.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from querying the gate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaintenanceError {
    #[error("maintenance check canceled")]
    Canceled,
}

/// Read-only capability handed to every orchestrator action.
pub trait MaintenanceGate: Clone + Send + Sync + 'static {
    /// Whether maintenance is currently enabled.
    ///
    /// Fails only if `ctx` was canceled (the caller is shutting down).
    fn is_enabled(&self, ctx: &CancellationToken) -> Result<bool, MaintenanceError>;
}

/// Gate state machine. There is no automatic exit from `Maintenance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceMode {
    Normal,
    Maintenance,
}

impl fmt::Display for MaintenanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceMode::Normal => write!(f, "normal"),
            MaintenanceMode::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// Shared maintenance flag.
///
/// Cloning shares the flag. Reads are a single atomic load. `enable` and
/// `disable` are the administrative toggles and are the only writers.
#[derive(Clone, Default)]
pub struct Maintenance {
    enabled: Arc<AtomicBool>,
}

impl Maintenance {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Enter maintenance. Returns the previous mode.
    pub fn enable(&self) -> MaintenanceMode {
        Self::mode_of(self.enabled.swap(true, Ordering::AcqRel))
    }

    /// Leave maintenance. Returns the previous mode.
    pub fn disable(&self) -> MaintenanceMode {
        Self::mode_of(self.enabled.swap(false, Ordering::AcqRel))
    }

    pub fn mode(&self) -> MaintenanceMode {
        Self::mode_of(self.enabled.load(Ordering::Acquire))
    }

    fn mode_of(enabled: bool) -> MaintenanceMode {
        if enabled {
            MaintenanceMode::Maintenance
        } else {
            MaintenanceMode::Normal
        }
    }
}

impl fmt::Debug for Maintenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maintenance")
            .field("mode", &self.mode())
            .finish()
    }
}

impl MaintenanceGate for Maintenance {
    fn is_enabled(&self, ctx: &CancellationToken) -> Result<bool, MaintenanceError> {
        if ctx.is_cancelled() {
            return Err(MaintenanceError::Canceled);
        }
        Ok(self.enabled.load(Ordering::Acquire))
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
