//! PathCache (C4): memoises path queries keyed on (tx, rx, frequency), with
//! at-most-one concurrent compute per key and an explicit invalidation path.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, OnceLock},
};

use crate::{error::ProviderError, node::NodeId, path::PathSample, units::Frequency};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tx: NodeId,
    rx: NodeId,
    frequency_bits: u64,
}

impl CacheKey {
    fn new(tx: &NodeId, rx: &NodeId, frequency: Frequency) -> Self {
        Self {
            tx: tx.clone(),
            rx: rx.clone(),
            frequency_bits: frequency.hz().to_bits(),
        }
    }
}

/// A single cache slot. The `OnceLock` makes compute-on-miss race-free
/// without holding the map lock for the duration of the (possibly
/// suspending) path query: the first caller to insert an empty slot
/// computes it, everyone else blocks on the same `OnceLock`.
type Slot = Arc<OnceLock<Result<PathSample, ProviderError>>>;

/// Stores computed path samples, serializing compute-on-miss per key while
/// letting distinct keys compute concurrently. There is no eviction: the
/// working set is O(N^2) in the node count, acceptable at the target scale.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
    /// NodeId -> keys touching that node, maintained on insertion so
    /// `invalidate_node` is O(touched keys) rather than O(cache size).
    by_node: Mutex<HashMap<NodeId, HashSet<CacheKey>>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached sample for (tx, rx, frequency), computing it via
    /// `compute` on first access. Concurrent callers for the same key
    /// observe the same computation; callers for distinct keys never block
    /// on each other. `compute` is only ever invoked once per key: callers
    /// capture whatever positions/provider/deadline the query needs in the
    /// closure, which keeps the cache itself agnostic to how a sample is
    /// produced (a bare [`crate::path::PathProvider`] or the orchestrator's
    /// [`crate::engine_registry::EngineRegistry`] fallback logic alike).
    pub fn get_or_compute(
        &self,
        tx: &NodeId,
        rx: &NodeId,
        frequency: Frequency,
        compute: impl FnOnce() -> Result<PathSample, ProviderError>,
    ) -> Result<PathSample, ProviderError> {
        let key = CacheKey::new(tx, rx, frequency);

        let slot = {
            let mut entries = self.entries.lock().expect("path cache mutex poisoned");
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceLock::new()))
                .clone()
        };

        let result = slot.get_or_init(compute);

        if result.is_ok() {
            self.index_key(tx, rx, &key);
        } else {
            // A failed compute must not leave a poisoned entry behind for
            // the next attempt; drop the slot so a later call retries.
            self.remove_key(&key);
        }

        result.clone()
    }

    fn index_key(&self, tx: &NodeId, rx: &NodeId, key: &CacheKey) {
        let mut by_node = self.by_node.lock().expect("path cache index poisoned");
        by_node.entry(tx.clone()).or_default().insert(key.clone());
        by_node.entry(rx.clone()).or_default().insert(key.clone());
    }

    fn remove_key(&self, key: &CacheKey) {
        self.entries
            .lock()
            .expect("path cache mutex poisoned")
            .remove(key);
    }

    /// Removes every cache entry whose key mentions `node`. Called whenever
    /// a node's position changes, so stale samples are never served.
    pub fn invalidate_node(&self, node: &NodeId) {
        let touched = {
            let mut by_node = self.by_node.lock().expect("path cache index poisoned");
            by_node.remove(node).unwrap_or_default()
        };

        if touched.is_empty() {
            return;
        }

        let mut entries = self.entries.lock().expect("path cache mutex poisoned");
        for key in &touched {
            entries.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("path cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
