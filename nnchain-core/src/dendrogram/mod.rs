//! Merge-order fixup and flat-partition queries.
//!
//! The chain discovers the right merges but not in dendrogram order, so a
//! [`Dendrogram`] stably sorts them by distance once. Every later query
//! (a partition at `k` clusters, a cut at a distance, the heuristic cluster
//! count) replays that sorted list without touching the data again.

mod selection;
mod union_find;

use crate::{error::DendrogramError, result::ClusteringResult};

use self::union_find::DisjointSet;

/// One agglomeration step.
///
/// Clusters are named by their lowest point index, so `kept < removed`
/// always holds and both ids are points inside the merged cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Merge {
    kept: usize,
    removed: usize,
    distance: f64,
    size: usize,
}

impl Merge {
    pub(crate) const fn new(kept: usize, removed: usize, distance: f64, size: usize) -> Self {
        Self {
            kept,
            removed,
            distance,
            size,
        }
    }

    /// Id of the surviving cluster.
    #[must_use]
    #[rustfmt::skip]
    pub const fn kept(&self) -> usize { self.kept }

    /// Id retired by the merge.
    #[must_use]
    #[rustfmt::skip]
    pub const fn removed(&self) -> usize { self.removed }

    /// Dissimilarity between the two clusters when they merged.
    #[must_use]
    #[rustfmt::skip]
    pub const fn distance(&self) -> f64 { self.distance }

    /// Number of points in the merged cluster at discovery time.
    #[must_use]
    #[rustfmt::skip]
    pub const fn size(&self) -> usize { self.size }
}

/// A row of a SciPy-style linkage matrix.
///
/// Leaves are numbered `0..n`; the cluster created by sorted merge `i` is
/// numbered `n + i`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkageRow {
    /// Smaller node id joined by this row.
    pub left: usize,
    /// Larger node id joined by this row.
    pub right: usize,
    /// Merge distance.
    pub distance: f64,
    /// Number of points in the resulting cluster.
    pub size: usize,
}

/// The full merge hierarchy of one clustering pass.
///
/// # Examples
/// ```
/// use nnchain_core::{DenseSource, Linkage, NnChainBuilder};
///
/// let source = DenseSource::try_new(
///     "pairs",
///     vec![vec![0.0], vec![0.5], vec![10.0], vec![10.5]],
/// )?;
/// let dendrogram = NnChainBuilder::new()
///     .with_linkage(Linkage::Single)
///     .build()?
///     .fit(&source)?;
///
/// assert_eq!(dendrogram.merges().len(), 3);
/// assert_eq!(dendrogram.labels(2)?, vec![0, 0, 1, 1]);
/// assert_eq!(dendrogram.labels(1)?, vec![0, 0, 0, 0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    point_count: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    /// Builds a dendrogram from merges in discovery order, stably sorting
    /// them by non-decreasing distance.
    pub(crate) fn from_discovery(point_count: usize, mut merges: Vec<Merge>) -> Self {
        merges.sort_by(|left, right| left.distance.total_cmp(&right.distance));
        Self {
            point_count,
            merges,
        }
    }

    /// Number of clustered points.
    #[must_use]
    #[rustfmt::skip]
    pub const fn point_count(&self) -> usize { self.point_count }

    /// Merges in non-decreasing distance order.
    #[must_use]
    #[rustfmt::skip]
    pub fn merges(&self) -> &[Merge] { &self.merges }

    /// Merge distances in non-decreasing order.
    pub fn distances(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.merges.iter().map(Merge::distance)
    }

    /// Labels every point for a partition into `cluster_count` clusters.
    ///
    /// Replays the first `point_count - cluster_count` merges and numbers the
    /// resulting clusters `0..cluster_count` in order of their lowest point.
    ///
    /// # Errors
    /// Returns [`DendrogramError::InvalidClusterCount`] unless
    /// `1 <= cluster_count <= point_count`.
    pub fn labels(&self, cluster_count: usize) -> Result<Vec<usize>, DendrogramError> {
        if cluster_count == 0 || cluster_count > self.point_count {
            return Err(DendrogramError::InvalidClusterCount {
                requested: cluster_count,
                point_count: self.point_count,
            });
        }
        Ok(self.replay(self.point_count - cluster_count))
    }

    /// Same as [`Self::labels`], wrapped as a [`ClusteringResult`].
    ///
    /// # Errors
    /// Returns [`DendrogramError::InvalidClusterCount`] unless
    /// `1 <= cluster_count <= point_count`.
    pub fn assign(&self, cluster_count: usize) -> Result<ClusteringResult, DendrogramError> {
        self.labels(cluster_count).map(ClusteringResult::from_labels)
    }

    /// Labels every point for the partition formed by all merges at or below
    /// `threshold`.
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::{DenseSource, Linkage, NnChainBuilder};
    ///
    /// let source = DenseSource::try_new("line", vec![vec![0.0], vec![1.0], vec![5.0]])?;
    /// let dendrogram = NnChainBuilder::new()
    ///     .with_linkage(Linkage::Single)
    ///     .build()?
    ///     .fit(&source)?;
    /// assert_eq!(dendrogram.cut_at_distance(1.0), vec![0, 0, 1]);
    /// assert_eq!(dendrogram.cut_at_distance(0.5), vec![0, 1, 2]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn cut_at_distance(&self, threshold: f64) -> Vec<usize> {
        let applied = self
            .merges
            .partition_point(|merge| merge.distance <= threshold);
        self.replay(applied)
    }

    /// Picks a cluster count in `low..=high` with the jump heuristic.
    ///
    /// `high` is clamped to the number of points. The result is a
    /// best-effort suggestion: the count whose stopping point precedes the
    /// most anomalous rise in merge distance, or `low` when the window holds
    /// no scorable step.
    ///
    /// # Errors
    /// Returns [`DendrogramError::InvalidClusterRange`] when `low` is zero,
    /// `low > high`, or `low` exceeds the number of points.
    pub fn select_cluster_count(&self, low: usize, high: usize) -> Result<usize, DendrogramError> {
        if low == 0 || low > high || low > self.point_count {
            return Err(DendrogramError::InvalidClusterRange {
                low,
                high,
                point_count: self.point_count,
            });
        }
        let high = high.min(self.point_count);
        Ok(selection::best_cluster_count(
            &self.merges,
            self.point_count,
            low,
            high,
        ))
    }

    /// Encodes the hierarchy as SciPy-style linkage rows.
    #[must_use]
    pub fn linkage_matrix(&self) -> Vec<LinkageRow> {
        let mut sets = DisjointSet::new(self.point_count);
        self.merges
            .iter()
            .enumerate()
            .map(|(step, merge)| {
                let left_root = sets.find(merge.kept);
                let right_root = sets.find(merge.removed);
                let (left_node, right_node) = (sets.node[left_root], sets.node[right_root]);
                let root = sets.union(left_root, right_root);
                sets.node[root] = self.point_count + step;
                LinkageRow {
                    left: left_node.min(right_node),
                    right: left_node.max(right_node),
                    distance: merge.distance,
                    size: sets.set_size(root),
                }
            })
            .collect()
    }

    fn replay(&self, applied: usize) -> Vec<usize> {
        let mut sets = DisjointSet::new(self.point_count);
        for merge in self.merges.iter().take(applied) {
            sets.union(merge.kept, merge.removed);
        }
        sets.labels()
    }
}
