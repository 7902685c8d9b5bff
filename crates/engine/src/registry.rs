// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node map of readiness publishers

use crate::publish::{ReadinessPublisher, ReadySink, ReadySubscription};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use wsd_core::WorkspaceId;

/// Publishers by workspace id; one live publisher per workspace instance.
#[derive(Clone, Default)]
pub struct ReadinessRegistry {
    inner: Arc<Mutex<HashMap<WorkspaceId, Arc<ReadinessPublisher>>>>,
}

impl ReadinessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh publisher for a new instance of `id`, dropping any
    /// previous instance's publisher.
    pub fn replace(
        &self,
        id: &WorkspaceId,
        sinks: Vec<Arc<dyn ReadySink>>,
    ) -> Arc<ReadinessPublisher> {
        let publisher = Arc::new(ReadinessPublisher::with_sinks(id.clone(), sinks));
        self.inner.lock().insert(id.clone(), Arc::clone(&publisher));
        publisher
    }

    pub fn get(&self, id: &WorkspaceId) -> Option<Arc<ReadinessPublisher>> {
        self.inner.lock().get(id).cloned()
    }

    pub fn subscribe(&self, id: &WorkspaceId) -> Option<ReadySubscription> {
        self.get(id).map(|p| p.subscribe())
    }

    pub fn remove(&self, id: &WorkspaceId) -> Option<Arc<ReadinessPublisher>> {
        self.inner.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
