// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parent/child exit protocol for the isolated content initializer.
//!
//! The child writes exactly one report line to stdout and exits with
//! [`EXIT_SUCCESS`] or [`EXIT_CONTENT_FAILED`]. Any other termination is an
//! infrastructure fault.

use crate::outcome::InitOutcome;
use serde::{Deserialize, Serialize};

/// Content is in place.
pub const EXIT_SUCCESS: i32 = 0;

/// Content initialization failed for a content-fetch reason.
pub const EXIT_CONTENT_FAILED: i32 = 42;

/// Prefix marking the report line, so stray output on stdout is ignored.
pub const REPORT_PREFIX: &str = "wsd-report ";

/// Structured result the child hands back before exiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildReport {
    pub outcome: InitOutcome,
}

impl ChildReport {
    pub fn new(outcome: InitOutcome) -> Self {
        Self { outcome }
    }

    /// Exit code matching this report.
    pub fn exit_code(&self) -> i32 {
        if self.outcome.succeeded() {
            EXIT_SUCCESS
        } else {
            EXIT_CONTENT_FAILED
        }
    }

    /// Encode as a single stdout line (newline included).
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{}{}\n", REPORT_PREFIX, serde_json::to_string(self)?))
    }

    /// Find the last report line in the child's stdout.
    ///
    /// Returns `None` when no line carries a parsable report.
    pub fn parse_stdout(stdout: &str) -> Option<Self> {
        stdout
            .lines()
            .rev()
            .filter_map(|line| line.strip_prefix(REPORT_PREFIX))
            .find_map(|json| serde_json::from_str(json).ok())
    }
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
