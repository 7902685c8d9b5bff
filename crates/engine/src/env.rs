// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Wall-clock budget of one child run.
pub fn init_timeout() -> Option<Duration> {
    parse_duration_ms("WSD_INIT_TIMEOUT_MS")
}

/// Maximum child runs per initialization (values below 1 are ignored).
pub fn init_max_attempts() -> Option<u32> {
    std::env::var("WSD_INIT_MAX_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|n| *n >= 1)
}

/// Base delay of the exponential retry backoff.
pub fn init_backoff() -> Option<Duration> {
    parse_duration_ms("WSD_INIT_BACKOFF_MS")
}

/// Poll interval of the ready-file watcher.
pub fn ready_poll_interval() -> Option<Duration> {
    parse_duration_ms("WSD_READY_POLL_MS").filter(|d| !d.is_zero())
}
