// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Each connection carries one request. Pod lifecycle requests go through
//! the orchestrator so the maintenance gate applies to them.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wsd_core::{Maintenance, MaintenanceMode};
use wsd_engine::{
    ActionOutput, ActionStatus, Orchestrator, ReadinessWaiter, SubscriptionSource, WaitResult,
    DEFERRED_REASON,
};
use wsd_daemon::protocol::{self, Request, Response, DEFAULT_TIMEOUT};

use crate::lifecycle::DaemonPods;

/// Shared state behind every connection
pub struct ListenCtx {
    pub orchestrator: Orchestrator<DaemonPods, Maintenance>,
    /// Writable side of the gate the orchestrator reads
    pub maintenance: Maintenance,
    pub shutdown: Arc<Notify>,
    /// Canceled when the daemon stops; aborts gate checks
    pub cancel: CancellationToken,
}

impl ListenCtx {
    pub fn new(
        pods: DaemonPods,
        maintenance: Maintenance,
        shutdown: Arc<Notify>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            orchestrator: Orchestrator::new(pods, maintenance.clone()),
            maintenance,
            shutdown,
            cancel,
        }
    }
}

/// Listener task for accepting socket connections.
pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { socket, ctx }
    }

    /// Run the accept loop, spawning a task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("Client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;
    if matches!(request, Request::Ping | Request::Status { .. }) {
        debug!(request = ?request, "received request");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx).await;
    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

/// Handle a single request and return a response.
pub(crate) async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    let agent = ctx.orchestrator.pods().agent();
    match request {
        Request::Ping => Response::Pong,

        Request::Init { spec } => {
            action_response(ctx.orchestrator.create_pod(spec, &ctx.cancel).await)
        }

        Request::Delete { id } => {
            action_response(ctx.orchestrator.delete_pod(&id, &ctx.cancel).await)
        }

        Request::Snapshot { id } => {
            action_response(ctx.orchestrator.snapshot(&id, &ctx.cancel).await)
        }

        Request::Status { id } => match agent.status(&id) {
            Some(status) => Response::Status { status },
            None => Response::error(format!("workspace not found: {id}")),
        },

        Request::WaitReady { id, timeout_ms } => {
            let Some(sub) = agent.subscribe(&id) else {
                return Response::error(format!("workspace not found: {id}"));
            };
            let mut waiter = ReadinessWaiter::new(SubscriptionSource::new(sub));
            match waiter.wait(Duration::from_millis(timeout_ms)).await {
                Ok(WaitResult::Ready(message)) => Response::Ready {
                    message: (*message).clone(),
                },
                Ok(WaitResult::Degraded) => Response::NotReady,
                Err(e) => Response::error(e),
            }
        }

        Request::SetMaintenance { enabled } => {
            set_maintenance(&ctx.maintenance, enabled);
            Response::Ok
        }

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::Ok
        }
    }
}

/// Flip the gate and log the transition. Returns the mode now in force.
pub(crate) fn set_maintenance(maintenance: &Maintenance, enabled: bool) -> MaintenanceMode {
    // enable/disable hand back the mode that was in force before the swap
    let previous = if enabled {
        maintenance.enable()
    } else {
        maintenance.disable()
    };
    match (enabled, previous) {
        (true, MaintenanceMode::Normal) => warn!("maintenance enabled, pod actions deferred"),
        (false, MaintenanceMode::Maintenance) => info!("maintenance disabled"),
        (_, mode) => debug!(mode = ?mode, "maintenance unchanged"),
    }
    maintenance.mode()
}

fn action_response(result: Result<ActionStatus, wsd_engine::OrchestratorError>) -> Response {
    match result {
        Ok(ActionStatus::Done(ActionOutput::Created)) => Response::Accepted,
        Ok(ActionStatus::Done(ActionOutput::Deleted)) => Response::Ok,
        Ok(ActionStatus::Done(ActionOutput::Snapshot(id))) => Response::Snapshot { id },
        Ok(ActionStatus::Deferred) => Response::Deferred {
            reason: DEFERRED_REASON.to_string(),
        },
        Err(e) => Response::error(e),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
