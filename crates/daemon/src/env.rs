// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Variable carrying the blob store root from the daemon to its children.
pub const BLOB_DIR_VAR: &str = "WSD_BLOB_DIR";

/// Resolve state directory: WSD_STATE_DIR > XDG_STATE_HOME/wsd > ~/.local/state/wsd
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("WSD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("wsd"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/wsd"))
}

/// Blob store root override
pub fn blob_dir() -> Option<PathBuf> {
    std::env::var(BLOB_DIR_VAR)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
