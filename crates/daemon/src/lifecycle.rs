// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};
use wsd_adapters::{FsBlobStore, TracedBlobStore};
use wsd_core::{Maintenance, UuidIdGen};
use wsd_engine::{ChildCommand, ChildRunner, LocalPods, NodeAgent, RunnerConfig};

use crate::env::{self, BLOB_DIR_VAR};

/// Pod adapter with the concrete types the daemon runs
pub type DaemonPods = LocalPods<ChildRunner, UuidIdGen, TracedBlobStore<FsBlobStore>>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/wsd)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Root of the filesystem blob store
    pub blob_path: PathBuf,
    pub runner: RunnerConfig,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::under(env::state_dir()?))
    }

    /// Configuration rooted at `state_dir`.
    pub fn under(state_dir: PathBuf) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            blob_path: env::blob_dir().unwrap_or_else(|| state_dir.join("blobs")),
            runner: RunnerConfig::from_env(),
            state_dir,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub pods: DaemonPods,
    pub maintenance: Maintenance,
}

/// Result of daemon startup: the daemon state and the bound socket.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DaemonState {
    /// Cancel every in-flight initialization, then remove the socket and
    /// PID file.
    pub async fn shutdown(&mut self) {
        info!("Shutting down daemon...");
        self.pods.agent().shutdown().await;

        for path in [&self.config.socket_path, &self.config.lock_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove file");
                }
            }
        }
        info!("Daemon shutdown complete");
    }
}

/// Start the daemon. `child` launches the isolated content initializer.
pub async fn startup(config: &Config, child: ChildCommand) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config, child).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // The lock and socket of a running daemon are not ours to remove
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(
    config: &Config,
    child: ChildCommand,
) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Lock first; open without truncating so a running daemon's PID survives
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    std::fs::create_dir_all(&config.blob_path)?;

    let child = child.env(BLOB_DIR_VAR, config.blob_path.to_string_lossy());
    let agent = NodeAgent::new(ChildRunner::new(child, config.runner));
    let blobs = TracedBlobStore::new(FsBlobStore::new(config.blob_path.clone()));
    let pods = LocalPods::new(agent, blobs);

    // Bind last, after everything else is in place
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        socket = %config.socket_path.display(),
        blobs = %config.blob_path.display(),
        timeout_ms = config.runner.timeout.as_millis() as u64,
        max_attempts = config.runner.retry.max_attempts,
        "Daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            pods,
            maintenance: Maintenance::new(false),
        },
        listener,
    })
}

fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.lock_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
