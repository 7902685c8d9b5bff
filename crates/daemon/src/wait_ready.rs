// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wsd wait-ready <target> [timeout-secs]`: in-workspace supervisor gate.
//!
//! Blocks until `<target>/.workspace/ready` appears. Prints the message and
//! exits 0 when content is ready, 1 when initialization failed. On timeout
//! it warns and exits 0 so the workspace starts degraded instead of hanging.

use std::path::PathBuf;
use std::time::Duration;

use wsd_engine::{ReadinessWaiter, ReadyFileSource, WaitResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

const EXIT_FAILED: i32 = 1;
const EXIT_USAGE: i32 = 2;

pub fn run(args: &[String]) -> i32 {
    let (target, timeout) = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("Usage: wsd wait-ready <target> [timeout-secs]");
            return EXIT_USAGE;
        }
    };
    setup_logging();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: cannot start runtime: {e}");
            return EXIT_FAILED;
        }
    };

    let mut waiter = ReadinessWaiter::new(ReadyFileSource::new(&target));
    match runtime.block_on(waiter.wait(timeout)) {
        Ok(WaitResult::Ready(msg)) => {
            match msg.to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("error: cannot encode ready message: {e}"),
            }
            if msg.succeeded() {
                0
            } else {
                EXIT_FAILED
            }
        }
        Ok(WaitResult::Degraded) => {
            eprintln!(
                "warning: workspace not ready after {}s, continuing degraded",
                timeout.as_secs()
            );
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            EXIT_FAILED
        }
    }
}

fn parse_args(args: &[String]) -> Result<(PathBuf, Duration), String> {
    match args {
        [target] => Ok((
            PathBuf::from(target),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )),
        [target, secs] => {
            let secs: f64 = secs
                .parse()
                .map_err(|_| format!("invalid timeout '{secs}'"))?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(format!("invalid timeout '{secs}'"));
            }
            Ok((PathBuf::from(target), Duration::from_secs_f64(secs)))
        }
        [] => Err("missing <target>".to_string()),
        _ => Err("too many arguments".to_string()),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
#[path = "wait_ready_tests.rs"]
mod tests;
