// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Git clone budget inside the child (default: 10 minutes).
pub fn git_timeout() -> Duration {
    parse_duration_ms("WSD_GIT_TIMEOUT_MS").unwrap_or(crate::subprocess::GIT_CLONE_TIMEOUT)
}

/// Git executable (default: `git` from PATH).
pub fn git_binary() -> String {
    std::env::var("WSD_GIT_BINARY").unwrap_or_else(|_| "git".to_string())
}
