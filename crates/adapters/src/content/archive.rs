// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup and snapshot restore

use super::stage::Stage;
use super::ContentError;
use crate::archive::{unpack_into, HashingReader};
use crate::blob::BlobStore;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

pub(super) fn restore_backup<B: BlobStore>(
    blobs: &B,
    key: &str,
    target: &Path,
) -> Result<(), ContentError> {
    let reader = blobs.open(key)?;
    let stage = Stage::new(target)?;
    extract(reader, key, stage.path(), false)?;
    stage.commit()
}

/// Snapshots are content-addressed: the blob is spooled next to the target
/// and its sha256 checked before anything is extracted.
pub(super) fn restore_snapshot<B: BlobStore>(
    blobs: &B,
    id: &str,
    target: &Path,
) -> Result<(), ContentError> {
    let fetch_err = |source| ContentError::Fetch {
        key: id.to_string(),
        source,
    };
    let mut reader = HashingReader::new(blobs.open(id)?);
    let parent = target.parent().unwrap_or(Path::new("/"));
    let mut spool = tempfile::tempfile_in(parent).map_err(fetch_err)?;
    std::io::copy(&mut reader, &mut spool).map_err(fetch_err)?;

    let actual = reader.digest();
    if actual != id {
        return Err(ContentError::DigestMismatch {
            key: id.to_string(),
            actual,
        });
    }
    spool.seek(SeekFrom::Start(0)).map_err(fetch_err)?;

    let stage = Stage::new(target)?;
    extract(spool, id, stage.path(), false)?;
    stage.commit()
}

pub(super) fn extract<R: Read>(
    reader: R,
    key: &str,
    dest: &Path,
    whiteouts: bool,
) -> Result<(), ContentError> {
    unpack_into(reader, dest, whiteouts).map_err(|source| ContentError::Extract {
        key: key.to_string(),
        source,
    })
}
