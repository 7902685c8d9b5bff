// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zstd-compressed tar archives for backups, layers and snapshots

use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Prefix marking an entry deleted by an overlay (OCI whiteout).
pub const WHITEOUT_PREFIX: &str = ".wh.";

/// zstd level used for everything this crate writes.
const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive i/o: {0}")]
    Io(#[from] io::Error),
    #[error("cannot walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
    #[error("unsafe entry path in archive: {0}")]
    UnsafePath(PathBuf),
}

/// Pack the contents of `src` (not `src` itself) into `writer`.
///
/// Entries are appended in sorted order; symlinks are stored as links.
pub fn pack_dir<W: Write>(src: &Path, writer: W) -> Result<W, ArchiveError> {
    let encoder = zstd::Encoder::new(writer, COMPRESSION_LEVEL)?;
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: src.to_path_buf(),
            message: e.to_string(),
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| ArchiveError::UnsafePath(entry.path().to_path_buf()))?;
        if entry.file_type().is_dir() {
            builder.append_dir(rel, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), rel)?;
        }
    }

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

/// Unpack a zstd tar stream into `dest`.
///
/// With `whiteouts` set, `.wh.<name>` entries delete `<name>` from `dest`
/// instead of being written, so a delta can remove files of the layer
/// below it.
pub fn unpack_into<R: Read>(reader: R, dest: &Path, whiteouts: bool) -> Result<(), ArchiveError> {
    let decoder = zstd::Decoder::new(reader)?;
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        if whiteouts {
            if let Some(victim) = whiteout_target(&path)? {
                remove_below(dest, &victim)?;
                continue;
            }
        }

        // unpack_in refuses entries escaping dest and returns false
        if !entry.unpack_in(dest)? {
            return Err(ArchiveError::UnsafePath(path));
        }
    }
    Ok(())
}

/// For a whiteout entry, the relative path it deletes.
fn whiteout_target(path: &Path) -> Result<Option<PathBuf>, ArchiveError> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let Some(victim) = name.strip_prefix(WHITEOUT_PREFIX) else {
        return Ok(None);
    };
    if victim.is_empty() || victim == "." || victim == ".." {
        return Err(ArchiveError::UnsafePath(path.to_path_buf()));
    }
    let target = match path.parent() {
        Some(parent) => parent.join(victim),
        None => PathBuf::from(victim),
    };
    if target
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir))
    {
        return Err(ArchiveError::UnsafePath(path.to_path_buf()));
    }
    Ok(Some(target))
}

/// Remove `dest/victim` without following symlinks in its parents, so an
/// earlier entry cannot redirect the removal outside `dest`.
fn remove_below(dest: &Path, victim: &Path) -> Result<(), ArchiveError> {
    let mut dir = dest.to_path_buf();
    if let Some(parent) = victim.parent() {
        for component in parent.components() {
            dir.push(component);
            match std::fs::symlink_metadata(&dir) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(ArchiveError::UnsafePath(victim.to_path_buf()));
                }
                Ok(meta) if meta.is_dir() => {}
                // Nothing below a missing or non-directory parent to delete
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(remove_path(&dest.join(victim))?)
}

fn remove_path(path: &Path) -> io::Result<()> {
    let result = match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Total size of regular files below `root`; unreadable entries are skipped.
pub fn tree_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Reader adapter computing the sha256 of everything read through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Content-addressed id of the bytes read so far (`sha256:<hex>`).
    pub fn digest(self) -> String {
        format_digest(&self.hasher.finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// Writer adapter computing the sha256 of everything written through it.
pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Returns the wrapped writer and the `sha256:<hex>` digest.
    pub fn finish(self) -> (W, String) {
        (self.inner, format_digest(&self.hasher.finalize()))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn format_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(7 + bytes.len() * 2);
    out.push_str("sha256:");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
