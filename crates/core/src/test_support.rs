// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{ContentSource, ContentSourceSpec};
use std::path::Path;

// ── Spec factory functions ──────────────────────────────────────────────────

pub fn empty_spec(id: &str, target: &Path) -> ContentSourceSpec {
    ContentSourceSpec::new(id, ContentSource::Empty, target)
}

pub fn git_spec(id: &str, origin: &str, target: &Path) -> ContentSourceSpec {
    ContentSourceSpec::new(
        id,
        ContentSource::FromGitClone {
            origin: origin.to_string(),
            revision: None,
        },
        target,
    )
}

pub fn backup_spec(id: &str, key: &str, target: &Path) -> ContentSourceSpec {
    ContentSourceSpec::new(
        id,
        ContentSource::FromBackup {
            origin: key.to_string(),
        },
        target,
    )
}

pub fn snapshot_spec(id: &str, snapshot: &str, target: &Path) -> ContentSourceSpec {
    ContentSourceSpec::new(
        id,
        ContentSource::FromSnapshot {
            origin: snapshot.to_string(),
        },
        target,
    )
}

pub fn prebuild_spec(
    id: &str,
    layer: &str,
    delta: Option<&str>,
    repository: &str,
    target: &Path,
) -> ContentSourceSpec {
    ContentSourceSpec::new(
        id,
        ContentSource::FromPrebuild {
            origin: layer.to_string(),
            delta: delta.map(str::to_string),
            repository: repository.to_string(),
        },
        target,
    )
}
