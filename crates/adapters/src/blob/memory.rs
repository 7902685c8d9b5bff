// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory blob store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BlobError, BlobStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

#[derive(Default)]
struct MemoryState {
    blobs: HashMap<String, Arc<Vec<u8>>>,
    /// Keys whose reads fail with an I/O error
    broken: Vec<String>,
    opens: Vec<String>,
}

/// In-memory blob store with failure injection
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.inner
            .lock()
            .blobs
            .insert(key.to_string(), Arc::new(data));
    }

    /// Make every open of `key` fail with an I/O error.
    pub fn break_key(&self, key: &str) {
        self.inner.lock().broken.push(key.to_string());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().blobs.get(key).map(|b| b.as_ref().clone())
    }

    /// Keys passed to `open`, in order
    pub fn opens(&self) -> Vec<String> {
        self.inner.lock().opens.clone()
    }
}

impl BlobStore for MemoryBlobStore {
    fn open(&self, key: &str) -> Result<Box<dyn Read + Send>, BlobError> {
        let mut state = self.inner.lock();
        state.opens.push(key.to_string());
        if state.broken.iter().any(|k| k == key) {
            return Err(BlobError::Io {
                key: key.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset",
                ),
            });
        }
        match state.blobs.get(key) {
            Some(data) => Ok(Box::new(Cursor::new(data.as_ref().clone()))),
            None => Err(BlobError::NotFound(key.to_string())),
        }
    }

    fn put(&self, key: &str, data: &mut dyn Read) -> Result<u64, BlobError> {
        let mut buf = Vec::new();
        data.read_to_end(&mut buf).map_err(|source| BlobError::Io {
            key: key.to_string(),
            source,
        })?;
        let len = buf.len() as u64;
        self.insert(key, buf);
        Ok(len)
    }

    fn exists(&self, key: &str) -> bool {
        self.inner.lock().blobs.contains_key(key)
    }
}
