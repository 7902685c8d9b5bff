// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace daemon (wsd)
//!
//! One binary, three roles:
//! - no arguments: node agent daemon listening on a Unix socket
//! - `content-init`: isolated child that populates one workspace
//! - `wait-ready`: in-workspace supervisor gate on the ready file

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod child;
mod env;
mod lifecycle;
mod listener;
mod wait_ready;

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use wsd_engine::{ChildCommand, CHILD_SUBCOMMAND};

use crate::lifecycle::{Config, LifecycleError, StartupResult};
use crate::listener::{ListenCtx, Listener};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_daemon(),
        Some(CHILD_SUBCOMMAND) => std::process::exit(child::run()),
        Some("wait-ready") => std::process::exit(wait_ready::run(&args[1..])),
        Some("--version" | "-V" | "-v") => {
            println!("wsd {VERSION}");
            Ok(())
        }
        Some("--help" | "-h" | "help") => {
            print_help();
            Ok(())
        }
        Some(arg) => {
            eprintln!("error: unexpected argument '{arg}'");
            eprintln!("Usage: wsd [content-init | wait-ready <target> [timeout-secs] | --help | --version]");
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("wsd {VERSION}");
    println!("Workspace daemon - initializes workspace content and signals readiness");
    println!();
    println!("USAGE:");
    println!("    wsd                                      Run the node agent daemon");
    println!("    wsd {CHILD_SUBCOMMAND}                         Populate one workspace (spec on stdin)");
    println!(
        "    wsd wait-ready <target> [timeout-secs]   Wait for the workspace ready file (default {}s)",
        wait_ready::DEFAULT_TIMEOUT_SECS
    );
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

#[tokio::main]
async fn run_daemon() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let log_guard = setup_logging(&config)?;

    info!("Starting workspace daemon");

    let child = ChildCommand::current_exe()?;
    let StartupResult {
        mut daemon,
        listener: unix_listener,
    } = match lifecycle::startup(&config, child).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("wsd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let shutdown_notify = Arc::new(Notify::new());
    let cancel = CancellationToken::new();
    let ctx = Arc::new(ListenCtx::new(
        daemon.pods.clone(),
        daemon.maintenance.clone(),
        Arc::clone(&shutdown_notify),
        cancel.clone(),
    ));
    tokio::spawn(Listener::new(unix_listener, ctx).run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );
    // Signal ready for the parent process (e.g. systemd or a test harness)
    println!("READY");

    tokio::select! {
        _ = shutdown_notify.notified() => info!("Shutdown requested via command"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    cancel.cancel();
    daemon.shutdown().await;
    info!("Daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(
        dir,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
