// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staging directories for atomic populate

use super::ContentError;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Hidden sibling of the target that content is assembled in.
///
/// Dropping an uncommitted stage removes it, so a failed source never
/// leaves partial content behind. A child killed mid-populate never drops
/// its stage; [`sweep_stale`] removes those leftovers.
pub(super) struct Stage {
    dir: TempDir,
    target: PathBuf,
}

/// `.<target name>.wsd-`, shared by every stage of one target
fn stage_prefix(target: &Path) -> String {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workspace".to_string());
    format!(".{name}.wsd-")
}

fn stage_parent(target: &Path) -> &Path {
    target.parent().unwrap_or(Path::new("/"))
}

impl Stage {
    pub(super) fn new(target: &Path) -> Result<Self, ContentError> {
        let mkdir_err = |source| ContentError::Mkdir {
            path: target.to_path_buf(),
            source,
        };
        let dir = tempfile::Builder::new()
            .prefix(&stage_prefix(target))
            .tempdir_in(stage_parent(target))
            .map_err(mkdir_err)?;
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755))
            .map_err(mkdir_err)?;
        Ok(Self {
            dir,
            target: target.to_path_buf(),
        })
    }

    pub(super) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Atomically replace the (empty) target with the staged tree.
    ///
    /// A ready file carried in by restored content is dropped first, so the
    /// previous instance's message is never visible in the target.
    pub(super) fn commit(self) -> Result<(), ContentError> {
        crate::ready_file::remove_ready_file(self.dir.path()).map_err(|source| {
            ContentError::StaleReadyFile {
                path: crate::ready_file::ready_file_path(&self.target),
                source,
            }
        })?;
        let staged = self.dir.keep();
        if let Err(source) = std::fs::rename(&staged, &self.target) {
            let _ = std::fs::remove_dir_all(&staged);
            return Err(ContentError::Commit {
                path: self.target,
                source,
            });
        }
        Ok(())
    }
}

/// Remove stages of `target` left behind by a killed child.
///
/// Returns how many were removed. Only called while no other populate of
/// the same target can run.
pub(super) fn sweep_stale(target: &Path) -> std::io::Result<usize> {
    let prefix = stage_prefix(target);
    let entries = match std::fs::read_dir(stage_parent(target)) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(&prefix) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
