//! Concurrent point-distance cache with sharded LRU bookkeeping.
//!
//! Memoises raw singleton-to-singleton distances for sources whose distance
//! function is expensive. Values live in a [`DashMap`]; recency is tracked in
//! fixed-capacity LRU shards so eviction stays bounded under contention.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    num::NonZeroUsize,
    sync::{Mutex, PoisonError},
};

use dashmap::DashMap;
use lru::LruCache;
use tracing::{instrument, trace};

/// Configuration for the optional point-distance cache used by
/// [`crate::NnChain`].
///
/// # Examples
/// ```
/// use nnchain_core::DistanceCacheConfig;
/// use std::num::NonZeroUsize;
///
/// let config = DistanceCacheConfig::default()
///     .with_max_entries(NonZeroUsize::new(1024).expect("non-zero"));
/// assert_eq!(config.max_entries().get(), 1024);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DistanceCacheConfig {
    max_entries: NonZeroUsize,
}

impl DistanceCacheConfig {
    /// Default maximum number of cached distances retained before eviction.
    pub const DEFAULT_MAX_ENTRIES: NonZeroUsize = match NonZeroUsize::new(1_048_576) {
        Some(max) => max,
        None => NonZeroUsize::MIN,
    };

    /// Builds a configuration with the provided maximum capacity.
    #[must_use]
    pub const fn new(max_entries: NonZeroUsize) -> Self {
        Self { max_entries }
    }

    /// Updates the maximum number of cached entries retained before eviction.
    #[must_use]
    pub const fn with_max_entries(mut self, max: NonZeroUsize) -> Self {
        self.max_entries = max;
        self
    }

    /// Returns the maximum number of cached distances retained before eviction.
    #[must_use]
    pub const fn max_entries(&self) -> NonZeroUsize {
        self.max_entries
    }
}

impl Default for DistanceCacheConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ENTRIES)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct PairKey {
    left: usize,
    right: usize,
}

impl PairKey {
    const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { left: a, right: b }
        } else {
            Self { left: b, right: a }
        }
    }
}

#[derive(Debug)]
pub(crate) struct PendingMiss {
    key: PairKey,
}

#[derive(Debug)]
pub(crate) enum LookupOutcome {
    Hit(f32),
    Miss(PendingMiss),
}

const DEFAULT_LRU_SHARDS: usize = 64;
const TARGET_LRU_ENTRIES_PER_SHARD: usize = 4096;

#[derive(Debug)]
struct LruShard {
    usage: Mutex<LruCache<PairKey, ()>>,
}

impl LruShard {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            usage: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct DistanceCache {
    entries: DashMap<PairKey, f32>,
    shards: Vec<LruShard>,
}

impl DistanceCache {
    pub(crate) fn new(config: DistanceCacheConfig) -> Self {
        let capacity = config.max_entries().get();
        let shards = lru_shard_capacities(config.max_entries())
            .into_iter()
            .map(LruShard::new)
            .collect();
        Self {
            entries: DashMap::with_capacity(capacity.min(TARGET_LRU_ENTRIES_PER_SHARD)),
            shards,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn begin_lookup(&self, left: usize, right: usize) -> LookupOutcome {
        let key = PairKey::new(left, right);
        let cached = self.entries.get(&key).map(|entry| *entry);
        if let Some(value) = cached {
            self.touch(key);
            self.record_hit();
            LookupOutcome::Hit(value)
        } else {
            self.record_miss();
            LookupOutcome::Miss(PendingMiss { key })
        }
    }

    /// Stores a freshly computed distance. Non-finite values are passed
    /// through without being cached.
    pub(crate) fn complete_miss(&self, miss: PendingMiss, value: f32) -> f32 {
        let PendingMiss { key } = miss;
        if !value.is_finite() {
            trace!(?key, %value, "skipping non-finite distance");
            return value;
        }
        self.entries.insert(key, value);
        self.touch(key);
        value
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn touch(&self, key: PairKey) {
        let shard = self.shard_for_key(&key);
        let mut usage = shard.usage.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((evicted, ())) = usage.push(key, ()) {
            if evicted != key {
                self.entries.remove(&evicted);
                self.record_eviction();
            }
        }
    }

    fn shard_for_key(&self, key: &PairKey) -> &LruShard {
        let index = if self.shards.len() == 1 {
            0
        } else {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            (hasher.finish() as usize) % self.shards.len()
        };
        &self.shards[index]
    }

    #[cfg(feature = "metrics")]
    fn record_hit(&self) {
        metrics::counter!("nnchain_distance_cache_hits").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_hit(&self) {}

    #[cfg(feature = "metrics")]
    fn record_miss(&self) {
        metrics::counter!("nnchain_distance_cache_misses").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_miss(&self) {}

    #[cfg(feature = "metrics")]
    fn record_eviction(&self) {
        metrics::counter!("nnchain_distance_cache_evictions").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_eviction(&self) {}
}

fn lru_shard_capacities(total_capacity: NonZeroUsize) -> Vec<NonZeroUsize> {
    let total = total_capacity.get();
    let shard_count = total
        .div_ceil(TARGET_LRU_ENTRIES_PER_SHARD)
        .clamp(1, DEFAULT_LRU_SHARDS);
    let base = total / shard_count;
    let remainder = total % shard_count;

    (0..shard_count)
        .filter_map(|index| NonZeroUsize::new(base + usize::from(index < remainder)))
        .collect()
}
