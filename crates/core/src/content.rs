// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content source specification
//!
//! Describes how one workspace instance's filesystem gets populated. The
//! source is a closed variant: the child dispatches on it exactly once.

use crate::workspace::WorkspaceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where a workspace's initial content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ContentSource {
    /// Leave the workspace empty
    Empty,
    /// Clone a git repository
    FromGitClone {
        origin: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        revision: Option<String>,
    },
    /// Restore the workspace's last backup archive
    FromBackup { origin: String },
    /// Layer a prebuilt content root plus an optional incremental delta.
    ///
    /// `repository` is cloned instead when the prebuild layer does not exist.
    FromPrebuild {
        origin: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delta: Option<String>,
        repository: String,
    },
    /// Restore a content-addressed snapshot (`sha256:<hex>`)
    FromSnapshot { origin: String },
}

/// Discriminant of [`ContentSource`], used in logs and metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Empty,
    Git,
    Backup,
    Prebuild,
    Snapshot,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Empty => "empty",
            ContentKind::Git => "git",
            ContentKind::Backup => "backup",
            ContentKind::Prebuild => "prebuild",
            ContentKind::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContentSource {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentSource::Empty => ContentKind::Empty,
            ContentSource::FromGitClone { .. } => ContentKind::Git,
            ContentSource::FromBackup { .. } => ContentKind::Backup,
            ContentSource::FromPrebuild { .. } => ContentKind::Prebuild,
            ContentSource::FromSnapshot { .. } => ContentKind::Snapshot,
        }
    }

    /// Origin locator; `None` only for [`ContentSource::Empty`].
    pub fn origin(&self) -> Option<&str> {
        match self {
            ContentSource::Empty => None,
            ContentSource::FromGitClone { origin, .. }
            | ContentSource::FromBackup { origin }
            | ContentSource::FromPrebuild { origin, .. }
            | ContentSource::FromSnapshot { origin } => Some(origin),
        }
    }
}

/// Errors from spec validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("{kind} source requires a non-empty origin")]
    MissingOrigin { kind: ContentKind },
    #[error("prebuild source requires a fallback repository")]
    MissingRepository,
    #[error("target path must be absolute: {0}")]
    RelativeTarget(PathBuf),
}

/// Full description of one workspace's content initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSourceSpec {
    pub workspace_id: WorkspaceId,
    pub source: ContentSource,
    pub target_path: PathBuf,
}

impl ContentSourceSpec {
    pub fn new(
        workspace_id: impl Into<WorkspaceId>,
        source: ContentSource,
        target_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            source,
            target_path: target_path.into(),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.source.kind()
    }

    pub fn origin(&self) -> Option<&str> {
        self.source.origin()
    }

    /// Check the invariants a spec must satisfy before any child is spawned.
    pub fn validate(&self) -> Result<(), SpecError> {
        if !self.target_path.is_absolute() {
            return Err(SpecError::RelativeTarget(self.target_path.clone()));
        }
        if let Some(origin) = self.origin() {
            if origin.trim().is_empty() {
                return Err(SpecError::MissingOrigin { kind: self.kind() });
            }
        }
        if let ContentSource::FromPrebuild { repository, .. } = &self.source {
            if repository.trim().is_empty() {
                return Err(SpecError::MissingRepository);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
