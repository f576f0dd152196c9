//! Nearest-neighbour chain state machine.
//!
//! Each outer iteration grows a chain of successive nearest neighbours until
//! the newest entry points back at the entry two steps earlier; those two
//! clusters are reciprocal nearest neighbours and are merged. The chain
//! prefix survives the merge, so later iterations resume from it instead of
//! searching from scratch, which keeps the total work quadratic.

use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use crate::{
    datasource::DataSource, dendrogram::Merge, error::DataSourceError, linkage::LanceWilliams,
};

use super::{
    distance_cache::{DistanceCache, LookupOutcome},
    store::DissimilarityStore,
};

/// Smallest active-set size for which the scans fan out to the worker pool.
#[cfg(feature = "parallel")]
const MIN_PARALLEL_ACTIVE: usize = 100;

/// Execution knobs resolved by [`crate::NnChain`] before a fit.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EngineConfig {
    pub(crate) parallel: bool,
    /// Overrides the active-set size at which work fans out.
    pub(crate) parallel_threshold: Option<usize>,
}

/// Raw output of one fit, in discovery order.
#[derive(Debug)]
pub(crate) struct EngineOutcome {
    pub(crate) merges: Vec<Merge>,
    pub(crate) evaluations: usize,
    pub(crate) chain_extensions: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    BuildChain,
    ExtendChain,
    Merge,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: usize,
    distance: f64,
}

/// Picks the nearer candidate; equal distances keep the lower id.
fn closer(left: Option<Candidate>, right: Option<Candidate>) -> Option<Candidate> {
    match (left, right) {
        (Some(l), Some(r)) => {
            if r.distance < l.distance || (r.distance == l.distance && r.id < l.id) {
                Some(r)
            } else {
                Some(l)
            }
        }
        (l, None) => l,
        (None, r) => r,
    }
}

pub(crate) struct Engine<'a, D, L> {
    source: &'a D,
    rule: &'a L,
    cache: Option<&'a DistanceCache>,
    config: EngineConfig,
    /// Active cluster ids in ascending order.
    active: Vec<usize>,
    sizes: Vec<usize>,
    store: DissimilarityStore,
    chain: Vec<usize>,
    merges: Vec<Merge>,
    evaluations: AtomicUsize,
    chain_extensions: usize,
}

impl<'a, D, L> Engine<'a, D, L>
where
    D: DataSource + Sync,
    L: LanceWilliams,
{
    pub(crate) fn new(
        source: &'a D,
        rule: &'a L,
        cache: Option<&'a DistanceCache>,
        config: EngineConfig,
    ) -> Self {
        let points = source.len();
        Self {
            source,
            rule,
            cache,
            config,
            active: (0..points).collect(),
            sizes: vec![1; points],
            store: DissimilarityStore::new(points, config.parallel),
            chain: Vec::new(),
            merges: Vec::with_capacity(points.saturating_sub(1)),
            evaluations: AtomicUsize::new(0),
            chain_extensions: 0,
        }
    }

    /// Runs the state machine until one cluster remains.
    ///
    /// # Errors
    /// Returns the first [`DataSourceError`] raised while evaluating a
    /// distance.
    pub(crate) fn run(mut self) -> Result<EngineOutcome, DataSourceError> {
        let mut phase = if self.active.len() < 2 {
            Phase::Done
        } else {
            Phase::BuildChain
        };
        let (mut a, mut b) = (0, 0);
        // Dissimilarity of the newest chain link, i.e. d(a, b).
        let mut link = 0.0;

        while phase != Phase::Done {
            phase = match phase {
                Phase::BuildChain => match self.seed() {
                    Some(pair) => {
                        (a, b) = pair;
                        Phase::ExtendChain
                    }
                    None => Phase::Done,
                },
                Phase::ExtendChain => {
                    let nearest = self.nearest(a, b)?;
                    (b, a) = (a, nearest.id);
                    link = nearest.distance;
                    self.chain.push(a);
                    self.chain_extensions += 1;
                    if self.closes_cycle() {
                        Phase::Merge
                    } else {
                        Phase::ExtendChain
                    }
                }
                Phase::Merge => {
                    self.merge(a, b, link)?;
                    if self.active.len() > 1 {
                        Phase::BuildChain
                    } else {
                        Phase::Done
                    }
                }
                Phase::Done => Phase::Done,
            };
        }

        Ok(EngineOutcome {
            merges: self.merges,
            evaluations: self.evaluations.into_inner(),
            chain_extensions: self.chain_extensions,
        })
    }

    /// Chooses the pair `(a, b)` the next extension starts from.
    ///
    /// A chain longer than three entries drops its trailing `x, y, x` cycle
    /// and resumes from what is left; otherwise the chain restarts from the
    /// two lowest active ids.
    fn seed(&mut self) -> Option<(usize, usize)> {
        if self.chain.len() > 3 {
            let keep = self.chain.len() - 3;
            self.chain.truncate(keep);
            if let Some(&a) = self.chain.last() {
                if self.is_active(a) {
                    let predecessor = keep
                        .checked_sub(2)
                        .and_then(|index| self.chain.get(index).copied())
                        .filter(|&b| b != a && self.is_active(b));
                    let b = predecessor.or_else(|| self.first_active_except(a))?;
                    return Some((a, b));
                }
            }
        }

        self.chain.clear();
        let a = *self.active.first()?;
        let b = *self.active.get(1)?;
        self.chain.push(a);
        Some((a, b))
    }

    fn closes_cycle(&self) -> bool {
        let len = self.chain.len();
        len >= 3 && self.chain.get(len - 1) == self.chain.get(len - 3)
    }

    fn is_active(&self, id: usize) -> bool {
        self.active.binary_search(&id).is_ok()
    }

    fn first_active_except(&self, id: usize) -> Option<usize> {
        self.active.iter().copied().find(|&other| other != id)
    }

    /// Finds the active cluster nearest to `a`. The current candidate `b` is
    /// only displaced by a strictly smaller dissimilarity.
    fn nearest(&self, a: usize, b: usize) -> Result<Candidate, DataSourceError> {
        let incumbent = Candidate {
            id: b,
            distance: self.dissimilarity(a, b)?,
        };
        let challenger = if self.fans_out(self.active.len()) {
            self.par_scan(a, b)?
        } else {
            self.scan(a, b)?
        };
        Ok(match challenger {
            Some(candidate) if candidate.distance < incumbent.distance => candidate,
            _ => incumbent,
        })
    }

    fn scan(&self, a: usize, b: usize) -> Result<Option<Candidate>, DataSourceError> {
        let mut best = None;
        for &id in &self.active {
            if id == a || id == b {
                continue;
            }
            let distance = self.dissimilarity(a, id)?;
            if !distance.is_nan() {
                best = closer(best, Some(Candidate { id, distance }));
            }
        }
        Ok(best)
    }

    #[cfg(feature = "parallel")]
    fn par_scan(&self, a: usize, b: usize) -> Result<Option<Candidate>, DataSourceError> {
        self.active
            .par_iter()
            .copied()
            .filter(|&id| id != a && id != b)
            .try_fold(
                || None,
                |best, id| {
                    let distance = self.dissimilarity(a, id)?;
                    Ok::<_, DataSourceError>(if distance.is_nan() {
                        best
                    } else {
                        closer(best, Some(Candidate { id, distance }))
                    })
                },
            )
            .try_reduce(|| None, |left, right| Ok(closer(left, right)))
    }

    #[cfg(not(feature = "parallel"))]
    fn par_scan(&self, a: usize, b: usize) -> Result<Option<Candidate>, DataSourceError> {
        self.scan(a, b)
    }

    /// Merges `a` and `b` into the lower of the two ids.
    fn merge(&mut self, a: usize, b: usize, distance: f64) -> Result<(), DataSourceError> {
        let (kept, removed) = (a.min(b), a.max(b));
        let updates = self.merged_dissimilarities(kept, removed, distance)?;
        self.write_updates(kept, removed, &updates);

        let size = self.sizes[kept] + self.sizes[removed];
        self.sizes[kept] = size;
        self.sizes[removed] = 0;
        if let Ok(position) = self.active.binary_search(&removed) {
            self.active.remove(position);
        }
        for id in &mut self.chain {
            if *id == removed {
                *id = kept;
            }
        }

        trace!(kept, removed, distance, size, "merged clusters");
        self.merges.push(Merge::new(kept, removed, distance, size));
        Ok(())
    }

    /// Computes the dissimilarity between the merged cluster and every other
    /// active cluster. Reads only; the store is untouched until every value
    /// is known.
    fn merged_dissimilarities(
        &self,
        kept: usize,
        removed: usize,
        distance: f64,
    ) -> Result<Vec<(usize, f64)>, DataSourceError> {
        let update = |other: usize| -> Result<(usize, f64), DataSourceError> {
            let d_kept = self.dissimilarity(kept, other)?;
            let d_removed = self.dissimilarity(removed, other)?;
            let value = self.rule.update(
                self.sizes[kept],
                self.sizes[removed],
                self.sizes[other],
                d_kept,
                d_removed,
                distance,
            );
            Ok((other, value))
        };

        #[cfg(feature = "parallel")]
        if self.fans_out(self.active.len()) {
            return self
                .active
                .par_iter()
                .copied()
                .filter(|&other| other != kept && other != removed)
                .map(update)
                .collect();
        }

        self.active
            .iter()
            .copied()
            .filter(|&other| other != kept && other != removed)
            .map(update)
            .collect()
    }

    fn write_updates(&mut self, kept: usize, removed: usize, updates: &[(usize, f64)]) {
        #[cfg(feature = "parallel")]
        if self.fans_out(self.active.len()) {
            self.store.par_apply_merge(kept, removed, updates);
            return;
        }
        self.store.apply_merge(kept, removed, updates);
    }

    fn dissimilarity(&self, x: usize, y: usize) -> Result<f64, DataSourceError> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        match self.store.get(x, y) {
            Some(value) => Ok(value),
            None => self.point_distance(x, y).map(f64::from),
        }
    }

    fn point_distance(&self, x: usize, y: usize) -> Result<f32, DataSourceError> {
        let Some(cache) = self.cache else {
            return self.source.distance(x, y);
        };
        match cache.begin_lookup(x, y) {
            LookupOutcome::Hit(value) => Ok(value),
            LookupOutcome::Miss(miss) => {
                let value = self.source.distance(x, y)?;
                Ok(cache.complete_miss(miss, value))
            }
        }
    }

    #[cfg(feature = "parallel")]
    fn fans_out(&self, work: usize) -> bool {
        if !self.config.parallel {
            return false;
        }
        match self.config.parallel_threshold {
            Some(threshold) => work >= threshold,
            None => work >= MIN_PARALLEL_ACTIVE && work > 2 * rayon::current_num_threads(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    const fn fans_out(&self, _work: usize) -> bool {
        false
    }
}
