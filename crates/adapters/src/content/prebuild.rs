// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prebuild layer + delta, with git fallback

use super::archive::extract;
use super::stage::Stage;
use super::{ContentDeps, ContentError, META_PREBUILD_FALLBACK, META_PREBUILD_FALLBACK_REASON};
use crate::blob::BlobStore;
use crate::git::GitAdapter;
use std::collections::BTreeMap;
use std::path::Path;

pub(super) struct Layers<'a> {
    pub layer: &'a str,
    pub delta: Option<&'a str>,
    pub repository: &'a str,
}

/// Restore a prebuild.
///
/// The layer is shared between workspaces and never modified in place; the
/// delta overlays it by replacing entries (and deleting whiteouts). Only a
/// missing layer falls back to cloning the repository; every other failure
/// is reported as is.
pub(super) async fn restore<G: GitAdapter, B: BlobStore>(
    deps: &ContentDeps<G, B>,
    layers: &Layers<'_>,
    target: &Path,
    metadata: &mut BTreeMap<String, String>,
) -> Result<(), ContentError> {
    let layer = match deps.blobs.open(layers.layer) {
        Ok(reader) => reader,
        Err(e) if e.is_not_found() => {
            tracing::warn!(
                layer = layers.layer,
                repository = layers.repository,
                "prebuild layer missing, falling back to git clone"
            );
            metadata.insert(META_PREBUILD_FALLBACK.to_string(), "git-clone".to_string());
            metadata.insert(META_PREBUILD_FALLBACK_REASON.to_string(), e.to_string());
            return super::git::clone(&deps.git, layers.repository, None, target).await;
        }
        Err(e) => return Err(e.into()),
    };

    let stage = Stage::new(target)?;
    extract(layer, layers.layer, stage.path(), false)?;
    if let Some(delta) = layers.delta {
        let reader = deps.blobs.open(delta)?;
        extract(reader, delta, stage.path(), true)?;
    }
    stage.commit()
}
