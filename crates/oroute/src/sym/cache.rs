//! Fingerprint-keyed cache of orbit partitions.
//!
//! Detection cost is paid once per topology family; callers that solve many
//! instances of the same topology inject one cache value explicitly. There
//! is no process-global state and invalidation is explicit.

use std::collections::HashMap;
use std::sync::Arc;

use crate::topo::{Fingerprint, Topology};

use super::orbits::OrbitPartition;
use super::search::SymCfg;

/// Explicit, injectable orbit-partition cache.
#[derive(Clone, Debug, Default)]
pub struct SymmetryCache {
    entries: HashMap<Fingerprint, Arc<OrbitPartition>>,
}

impl SymmetryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fp: &Fingerprint) -> Option<Arc<OrbitPartition>> {
        self.entries.get(fp).cloned()
    }

    pub fn insert(&mut self, fp: Fingerprint, partition: Arc<OrbitPartition>) {
        self.entries.insert(fp, partition);
    }

    /// Drop the entry for `fp`, if present.
    pub fn invalidate(&mut self, fp: &Fingerprint) -> bool {
        self.entries.remove(fp).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached partition for `topo`, detecting and storing it on a miss.
    ///
    /// An incomplete (budget-hit) partition is cached too: re-detection would
    /// burn the same budget again, and the caller sees `complete = false`.
    pub fn get_or_detect(&mut self, topo: &Topology, cfg: &SymCfg) -> Arc<OrbitPartition> {
        let fp = topo.fingerprint();
        if let Some(hit) = self.get(&fp) {
            return hit;
        }
        let partition = Arc::new(OrbitPartition::detect(topo, cfg));
        self.insert(fp, partition.clone());
        partition
    }
}
