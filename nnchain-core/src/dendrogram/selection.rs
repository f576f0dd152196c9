//! Jump-detection heuristic for picking a cluster count.
//!
//! Walks the sorted merge distances and scores each step by how far its
//! increase over the previous merge deviates from the increases seen so far.
//! An unusually large jump suggests a natural place to stop merging. This is
//! a best-effort heuristic with no optimality guarantee.

use super::Merge;

/// Steps with fewer prior increments than this are not scored.
const MIN_PRIOR_INCREMENTS: usize = 2;

/// Running mean and variance (Welford).
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct OnlineStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl OnlineStats {
    pub(super) fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub(super) const fn count(&self) -> usize {
        self.count
    }

    pub(super) const fn mean(&self) -> f64 {
        self.mean
    }

    pub(super) fn std_dev(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.m2 / self.count as f64).sqrt()
        }
    }

    /// Standard score of `value`. A flat history scores any rise as
    /// infinitely surprising and anything else as zero.
    pub(super) fn z_score(&self, value: f64) -> f64 {
        let std_dev = self.std_dev();
        let mean = self.mean();
        if std_dev > 0.0 {
            (value - mean) / std_dev
        } else if value > mean {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// Returns the cluster count in `low..=high` whose stopping point precedes
/// the most anomalous jump, or `low` when no step in the window is scored.
///
/// Stopping just before sorted merge `i` leaves `point_count - i` clusters.
/// Callers validate the bounds.
pub(super) fn best_cluster_count(
    merges: &[Merge],
    point_count: usize,
    low: usize,
    high: usize,
) -> usize {
    let mut stats = OnlineStats::default();
    let mut best: Option<(f64, usize)> = None;

    for (index, pair) in merges.windows(2).enumerate() {
        let [previous, current] = pair else {
            continue;
        };
        let increment = current.distance() - previous.distance();
        let clusters = point_count.saturating_sub(index + 1);
        if (low..=high).contains(&clusters) && stats.count() >= MIN_PRIOR_INCREMENTS {
            let score = stats.z_score(increment);
            if !score.is_nan() && best.is_none_or(|(top, _)| score > top) {
                best = Some((score, clusters));
            }
        }
        stats.push(increment);
    }

    best.map_or(low, |(_, clusters)| clusters)
}
