// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed blob store

use super::{BlobError, BlobStore};
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// Stores each blob as a file under `root`.
///
/// Keys are `/`-separated; `:` (as in `sha256:<hex>`) maps to `-` so keys
/// stay portable file names.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path below the root, rejecting traversal.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        let invalid = || BlobError::InvalidKey(key.to_string());
        if key.is_empty() || key.starts_with('/') {
            return Err(invalid());
        }
        let mut path = self.root.clone();
        for segment in key.split('/') {
            let segment = segment.replace(':', "-");
            let mut components = Path::new(&segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) if segment != "." => path.push(&segment),
                _ => return Err(invalid()),
            }
        }
        Ok(path)
    }
}

impl BlobStore for FsBlobStore {
    fn open(&self, key: &str) -> Result<Box<dyn Read + Send>, BlobError> {
        let path = self.path_for(key)?;
        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(source) => Err(BlobError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, data: &mut dyn Read) -> Result<u64, BlobError> {
        let path = self.path_for(key)?;
        let io_err = |source| BlobError::Io {
            key: key.to_string(),
            source,
        };
        let parent = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(parent).map_err(io_err)?;

        // Readers never observe a half-written blob
        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        let written = std::io::copy(data, &mut tmp).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(written)
    }

    fn exists(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
