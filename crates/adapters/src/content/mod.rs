// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content source strategies.
//!
//! `populate` runs inside the isolated child. It dispatches once on the
//! spec's [`ContentSource`] and never returns an error: every failure is
//! folded into the returned [`InitOutcome`].

mod archive;
mod detect;
mod git;
mod prebuild;
mod stage;

pub use detect::project_type;

use crate::archive::ArchiveError;
use crate::blob::{BlobError, BlobStore};
use crate::git::{GitAdapter, GitError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use wsd_core::{ContentSource, ContentSourceSpec, FailureCode, InitOutcome};

/// Metadata key naming the content kind that populated the workspace
pub const META_CONTENT_SOURCE: &str = "content.source";
/// Metadata key for the detected project type
pub const META_PROJECT_TYPE: &str = "project.type";
/// Metadata key set when a prebuild was replaced by a git clone
pub const META_PREBUILD_FALLBACK: &str = "prebuild.fallback";
/// Metadata key carrying why the prebuild fallback happened
pub const META_PREBUILD_FALLBACK_REASON: &str = "prebuild.fallback.reason";

/// External collaborators of the content sources
#[derive(Clone)]
pub struct ContentDeps<G, B> {
    pub git: G,
    pub blobs: B,
}

impl<G: GitAdapter, B: BlobStore> ContentDeps<G, B> {
    pub fn new(git: G, blobs: B) -> Self {
        Self { git, blobs }
    }
}

/// Errors from populating a workspace
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot prepare {path}: {source}")]
    Mkdir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Git(#[from] GitError),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error("reading {key} failed: {source}")]
    Fetch {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{key} does not match its digest (got {actual})")]
    DigestMismatch { key: String, actual: String },
    #[error("extracting {key} failed: {source}")]
    Extract {
        key: String,
        #[source]
        source: ArchiveError,
    },
    #[error("cannot discard restored ready file {path}: {source}")]
    StaleReadyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot move content into {path}: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub fn code(&self) -> FailureCode {
        match self {
            ContentError::Mkdir { .. } | ContentError::Commit { .. } => FailureCode::MkdirFailed,
            ContentError::Git(_) => FailureCode::CloneFailed,
            ContentError::Blob(_)
            | ContentError::Fetch { .. }
            | ContentError::DigestMismatch { .. } => FailureCode::FetchFailed,
            ContentError::Extract { .. } | ContentError::StaleReadyFile { .. } => {
                FailureCode::ExtractFailed
            }
        }
    }
}

/// Populate `spec.target_path` from the spec's content source.
///
/// On failure the target is left as an empty directory (or absent when it
/// could not be created).
pub async fn populate<G: GitAdapter, B: BlobStore>(
    spec: &ContentSourceSpec,
    deps: &ContentDeps<G, B>,
) -> InitOutcome {
    let start = Instant::now();
    if let Err(e) = spec.validate() {
        return InitOutcome::failed(FailureCode::InvalidSpec, e.to_string())
            .with_duration(start.elapsed());
    }

    let target = spec.target_path.as_path();
    let mut metadata = BTreeMap::new();
    let result = match clean_slate(target) {
        Ok(()) => dispatch(spec, deps, &mut metadata).await,
        Err(e) => Err(e),
    };

    let mut outcome = match result {
        Ok(()) => {
            metadata.insert(
                META_CONTENT_SOURCE.to_string(),
                spec.kind().as_str().to_string(),
            );
            if let Some(project) = project_type(target) {
                metadata.insert(META_PROJECT_TYPE.to_string(), project.to_string());
            }
            InitOutcome::success(crate::archive::tree_size(target))
        }
        Err(e) => {
            tracing::warn!(
                workspace_id = %spec.workspace_id,
                kind = %spec.kind(),
                code = %e.code(),
                error = %e,
                "content initialization failed"
            );
            if let Err(cleanup) = clean_slate(target) {
                tracing::warn!(error = %cleanup, "cleanup after failure failed");
            }
            InitOutcome::failed(e.code(), e.to_string())
        }
    };
    outcome.metadata.extend(metadata);
    outcome.with_duration(start.elapsed())
}

async fn dispatch<G: GitAdapter, B: BlobStore>(
    spec: &ContentSourceSpec,
    deps: &ContentDeps<G, B>,
    metadata: &mut BTreeMap<String, String>,
) -> Result<(), ContentError> {
    let target = spec.target_path.as_path();
    match &spec.source {
        // clean_slate already left an empty directory
        ContentSource::Empty => Ok(()),
        ContentSource::FromGitClone { origin, revision } => {
            git::clone(&deps.git, origin, revision.as_deref(), target).await
        }
        ContentSource::FromBackup { origin } => archive::restore_backup(&deps.blobs, origin, target),
        ContentSource::FromSnapshot { origin } => {
            archive::restore_snapshot(&deps.blobs, origin, target)
        }
        ContentSource::FromPrebuild {
            origin,
            delta,
            repository,
        } => {
            let layers = prebuild::Layers {
                layer: origin,
                delta: delta.as_deref(),
                repository,
            };
            prebuild::restore(deps, &layers, target, metadata).await
        }
    }
}

/// Ensure `target` exists as an empty directory.
///
/// The directory itself is kept (it may be a mount point or carry a quota);
/// only its entries are removed, along with staging directories a killed
/// earlier attempt left next to it.
pub fn clean_slate(target: &Path) -> Result<(), ContentError> {
    let mkdir_err = |source| ContentError::Mkdir {
        path: target.to_path_buf(),
        source,
    };
    let swept = stage::sweep_stale(target).map_err(mkdir_err)?;
    if swept > 0 {
        tracing::info!(target = %target.display(), swept, "removed stale staging directories");
    }
    std::fs::create_dir_all(target).map_err(mkdir_err)?;
    for entry in std::fs::read_dir(target).map_err(mkdir_err)? {
        let entry = entry.map_err(mkdir_err)?;
        let path = entry.path();
        let is_dir = entry.file_type().map_err(mkdir_err)?.is_dir();
        let removed = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removed.map_err(mkdir_err)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
