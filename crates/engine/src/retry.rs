// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy for content initialization

use std::time::Duration;
use wsd_core::InitOutcome;

/// Exponential backoff over content-fetch failures.
///
/// Infrastructure faults, invalid specs and cancellation are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Whether another attempt should follow `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32, outcome: &InitOutcome) -> bool {
        attempt < self.max_attempts
            && outcome
                .failure_code()
                .is_some_and(|code| code.is_content_fetch())
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
