// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Initialization outcome and failure taxonomy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Machine-readable failure code. Serialized as kebab-case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCode {
    /// Target path could not be created
    MkdirFailed,
    /// Git clone failed (network, auth, bad revision)
    CloneFailed,
    /// Archive or blob could not be fetched
    FetchFailed,
    /// Archive was fetched but could not be unpacked
    ExtractFailed,
    /// Spec handed to the child was malformed
    InvalidSpec,
    /// Child exceeded its wall-clock budget and was killed
    Timeout,
    /// Child terminated outside the exit-code protocol
    ChildCrashed,
    /// Workspace was deleted while initializing
    Canceled,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::MkdirFailed => "mkdir-failed",
            FailureCode::CloneFailed => "clone-failed",
            FailureCode::FetchFailed => "fetch-failed",
            FailureCode::ExtractFailed => "extract-failed",
            FailureCode::InvalidSpec => "invalid-spec",
            FailureCode::Timeout => "timeout",
            FailureCode::ChildCrashed => "child-crashed",
            FailureCode::Canceled => "canceled",
        }
    }

    /// Failures caused by a flaky origin; safe to retry on a clean target.
    pub fn is_content_fetch(&self) -> bool {
        matches!(
            self,
            FailureCode::CloneFailed | FailureCode::FetchFailed | FailureCode::ExtractFailed
        )
    }

    /// Faults of the isolation machinery itself; never retried.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, FailureCode::Timeout | FailureCode::ChildCrashed)
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure code plus human-readable diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub code: FailureCode,
    pub message: String,
}

impl FailureReason {
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result of running a content source to completion.
///
/// Success is the absence of a failure reason, so a failed outcome always
/// carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
    #[serde(default)]
    pub bytes_written: u64,
    #[serde(default)]
    pub duration: Duration,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub attempts: u32,
}

impl InitOutcome {
    pub fn success(bytes_written: u64) -> Self {
        Self {
            bytes_written,
            ..Self::default()
        }
    }

    pub fn failure(reason: FailureReason) -> Self {
        Self {
            failure: Some(reason),
            ..Self::default()
        }
    }

    pub fn failed(code: FailureCode, message: impl Into<String>) -> Self {
        Self::failure(FailureReason::new(code, message))
    }

    pub fn canceled() -> Self {
        Self::failed(FailureCode::Canceled, "workspace deleted during initialization")
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure_code(&self) -> Option<FailureCode> {
        self.failure.as_ref().map(|f| f.code)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
