// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wsd-core: data model for workspace content initialization and readiness

pub mod child;
pub mod content;
pub mod id;
pub mod maintenance;
pub mod outcome;
pub mod ready;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use child::{ChildReport, EXIT_CONTENT_FAILED, EXIT_SUCCESS};
pub use content::{ContentKind, ContentSource, ContentSourceSpec, SpecError};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use maintenance::{Maintenance, MaintenanceError, MaintenanceGate, MaintenanceMode};
pub use outcome::{FailureCode, FailureReason, InitOutcome};
pub use ready::{ReadyOutcome, WorkspaceReadyMessage};
pub use workspace::{InstanceId, WorkspaceId, WorkspaceStatus};
