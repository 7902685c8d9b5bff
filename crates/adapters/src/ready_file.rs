// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ready file inside the workspace.
//!
//! The in-workspace supervisor learns about initialization through
//! `<target>/.workspace/ready`. The file is written to a temporary name and
//! renamed, so a reader sees either no file or the complete message.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wsd_core::WorkspaceReadyMessage;

const READY_DIR: &str = ".workspace";
const READY_FILE: &str = "ready";

#[derive(Debug, Error)]
pub enum ReadyFileError {
    #[error("ready file i/o: {0}")]
    Io(#[from] io::Error),
    #[error("malformed ready file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn ready_file_path(target: &Path) -> PathBuf {
    target.join(READY_DIR).join(READY_FILE)
}

pub fn write_ready_file(target: &Path, msg: &WorkspaceReadyMessage) -> Result<(), ReadyFileError> {
    let path = ready_file_path(target);
    let dir = target.join(READY_DIR);
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_vec(msg).map_err(|source| ReadyFileError::Malformed {
        path: path.clone(),
        source,
    })?;
    let tmp = dir.join(format!("{READY_FILE}.tmp"));
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// Read the ready file; `Ok(None)` while it does not exist yet.
pub fn read_ready_file(target: &Path) -> Result<Option<WorkspaceReadyMessage>, ReadyFileError> {
    let path = ready_file_path(target);
    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|source| ReadyFileError::Malformed { path, source })
}

pub fn remove_ready_file(target: &Path) -> io::Result<()> {
    match std::fs::remove_file(ready_file_path(target)) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
#[path = "ready_file_tests.rs"]
mod tests;
