//! Per-cluster dissimilarity maps with an adaptive dense or sparse layout.
//!
//! Singleton pairs are never stored: the engine recomputes them from the
//! data source. Once a cluster is formed by a merge it owns a map holding its
//! dissimilarity to every other active cluster, and every later merge
//! rewrites one entry in each map-owning cluster. A value may therefore live
//! in either endpoint's map, so lookups consult both.

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fresh maps are dense when more than `1 / DENSE_DIVISOR` of the points are
/// still active.
const DENSE_DIVISOR: usize = 100;
/// Dense maps whose live entries fall below `1 / COMPACT_DIVISOR` of the
/// points are rebuilt as sparse maps.
const COMPACT_DIVISOR: usize = 50;

/// Associative store from cluster id to cached dissimilarity.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DissimilarityMap {
    /// Array-backed slots indexed directly by cluster id.
    Dense { slots: Vec<Option<f64>>, live: usize },
    /// Hash-backed entries for sparsely populated maps.
    Sparse(HashMap<usize, f64>),
}

impl DissimilarityMap {
    pub(crate) fn dense(points: usize) -> Self {
        Self::Dense {
            slots: vec![None; points],
            live: 0,
        }
    }

    pub(crate) fn sparse(expected: usize) -> Self {
        Self::Sparse(HashMap::with_capacity(expected))
    }

    pub(crate) fn get(&self, id: usize) -> Option<f64> {
        match self {
            Self::Dense { slots, .. } => slots.get(id).copied().flatten(),
            Self::Sparse(entries) => entries.get(&id).copied(),
        }
    }

    pub(crate) fn insert(&mut self, id: usize, value: f64) {
        match self {
            Self::Dense { slots, live } => {
                if id >= slots.len() {
                    slots.resize(id + 1, None);
                }
                if let Some(slot) = slots.get_mut(id) {
                    if slot.replace(value).is_none() {
                        *live += 1;
                    }
                }
            }
            Self::Sparse(entries) => {
                entries.insert(id, value);
            }
        }
    }

    pub(crate) fn remove(&mut self, id: usize) -> Option<f64> {
        match self {
            Self::Dense { slots, live } => {
                let removed = slots.get_mut(id).and_then(Option::take);
                if removed.is_some() {
                    *live -= 1;
                }
                removed
            }
            Self::Sparse(entries) => entries.remove(&id),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Dense { live, .. } => *live,
            Self::Sparse(entries) => entries.len(),
        }
    }

    pub(crate) const fn is_dense(&self) -> bool {
        matches!(self, Self::Dense { .. })
    }

    /// Rebuilds a dense map as a sparse one, keeping its entries.
    pub(crate) fn compact(&mut self) {
        if let Self::Dense { slots, live } = self {
            let mut entries = HashMap::with_capacity(*live);
            entries.extend(
                slots
                    .iter()
                    .enumerate()
                    .filter_map(|(id, value)| value.map(|v| (id, v))),
            );
            *self = Self::Sparse(entries);
        }
    }
}

/// Chooses map layouts from the active-set occupancy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LayoutPolicy {
    points: usize,
    parallel: bool,
}

impl LayoutPolicy {
    pub(crate) const fn new(points: usize, parallel: bool) -> Self {
        Self { points, parallel }
    }

    /// Parallel runs always use dense maps so that every worker writes into
    /// preallocated slots.
    pub(crate) const fn prefers_dense(&self, active: usize) -> bool {
        self.parallel || active.saturating_mul(DENSE_DIVISOR) > self.points
    }

    pub(crate) fn should_compact(&self, map: &DissimilarityMap) -> bool {
        !self.parallel && map.is_dense() && map.len().saturating_mul(COMPACT_DIVISOR) < self.points
    }

    fn fresh_map(&self, active: usize) -> DissimilarityMap {
        if self.prefers_dense(active) {
            DissimilarityMap::dense(self.points)
        } else {
            DissimilarityMap::sparse(active)
        }
    }
}

/// Arena of per-cluster maps indexed by cluster id.
///
/// Cluster ids are point indices: a merge keeps the smaller id, so the arena
/// never grows past the number of points.
#[derive(Debug)]
pub(crate) struct DissimilarityStore {
    maps: Vec<Option<DissimilarityMap>>,
    policy: LayoutPolicy,
}

impl DissimilarityStore {
    pub(crate) fn new(points: usize, parallel: bool) -> Self {
        Self {
            maps: (0..points).map(|_| None).collect(),
            policy: LayoutPolicy::new(points, parallel),
        }
    }

    /// Looks up the cached dissimilarity between `x` and `y`, checking `x`'s
    /// map before `y`'s. Returns `None` when neither side owns a map, which
    /// means both are still singletons.
    pub(crate) fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.map(x)
            .and_then(|map| map.get(y))
            .or_else(|| self.map(y).and_then(|map| map.get(x)))
    }

    pub(crate) fn map(&self, id: usize) -> Option<&DissimilarityMap> {
        self.maps.get(id).and_then(Option::as_ref)
    }

    /// Installs the outcome of merging `removed` into `kept`.
    ///
    /// `updates` holds the new dissimilarity between the merged cluster and
    /// every other active cluster. Each map-owning cluster among them drops
    /// its entry for `removed` and overwrites its entry for `kept`; `kept`
    /// receives a fresh map holding all of `updates`.
    pub(crate) fn apply_merge(&mut self, kept: usize, removed: usize, updates: &[(usize, f64)]) {
        for &(other, value) in updates {
            if let Some(map) = self.maps.get_mut(other).and_then(Option::as_mut) {
                rewrite_entry(map, kept, removed, value, self.policy);
            }
        }
        self.install(kept, removed, updates);
    }

    /// Parallel counterpart of [`Self::apply_merge`]. Every worker owns a
    /// disjoint range of arena slots, so no map is written by two workers.
    #[cfg(feature = "parallel")]
    pub(crate) fn par_apply_merge(&mut self, kept: usize, removed: usize, updates: &[(usize, f64)]) {
        let mut incoming = vec![None; self.maps.len()];
        for &(other, value) in updates {
            if let Some(slot) = incoming.get_mut(other) {
                *slot = Some(value);
            }
        }
        let policy = self.policy;
        self.maps
            .par_iter_mut()
            .zip(incoming.par_iter())
            .for_each(|(slot, value)| {
                if let (Some(map), Some(value)) = (slot.as_mut(), *value) {
                    rewrite_entry(map, kept, removed, value, policy);
                }
            });
        self.install(kept, removed, updates);
    }

    fn install(&mut self, kept: usize, removed: usize, updates: &[(usize, f64)]) {
        let mut fresh = self.policy.fresh_map(updates.len() + 1);
        for &(other, value) in updates {
            fresh.insert(other, value);
        }
        if let Some(slot) = self.maps.get_mut(removed) {
            *slot = None;
        }
        if let Some(slot) = self.maps.get_mut(kept) {
            *slot = Some(fresh);
        }
    }
}

fn rewrite_entry(
    map: &mut DissimilarityMap,
    kept: usize,
    removed: usize,
    value: f64,
    policy: LayoutPolicy,
) {
    map.remove(removed);
    map.insert(kept, value);
    if policy.should_compact(map) {
        map.compact();
    }
}
