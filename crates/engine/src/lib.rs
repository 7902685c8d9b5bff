// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Node-side engine: isolated content initialization, retries, readiness
//! publication, and maintenance-gated orchestrator actions

mod agent;
pub mod env;
mod error;
mod local_pods;
mod orchestrator;
mod publish;
mod registry;
mod retry;
mod runner;
mod waiter;

#[cfg(test)]
mod test_helpers;

pub use agent::{ContentInitializer, NodeAgent};
pub use error::{AgentError, OrchestratorError, PodError, PublishError, SinkError, WaitError};
pub use local_pods::LocalPods;
pub use orchestrator::{ActionOutput, ActionStatus, Orchestrator, PodAdapter, DEFERRED_REASON};
pub use publish::{ReadinessPublisher, ReadyFileSink, ReadySink, ReadySubscription};
pub use registry::ReadinessRegistry;
pub use retry::RetryPolicy;
pub use runner::{ChildCommand, ChildRunner, RunnerConfig, CHILD_SUBCOMMAND};
pub use waiter::{ReadinessWaiter, ReadyFileSource, ReadySource, SubscriptionSource, WaitResult};

#[cfg(any(test, feature = "test-support"))]
pub use orchestrator::{FakePodAdapter, PodCall};
