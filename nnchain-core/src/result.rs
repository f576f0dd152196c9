//! Flat clustering results.
//!
//! A [`ClusteringResult`] is one partition cut from a
//! [`crate::Dendrogram`]: a label per point with identifiers numbered
//! contiguously from zero.

use thiserror::Error;

/// Represents the output of [`crate::NnChain::run`] or
/// [`crate::Dendrogram::assign`].
///
/// # Examples
/// ```
/// use nnchain_core::{ClusterId, ClusteringResult};
///
/// let result = ClusteringResult::try_from_assignments(vec![
///     ClusterId::new(0),
///     ClusterId::new(1),
///     ClusterId::new(0),
/// ])?;
/// assert_eq!(result.assignments().len(), 3);
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.cluster_sizes(), vec![2, 1]);
/// # Ok::<(), nnchain_core::NonContiguousClusterIds>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringResult {
    assignments: Vec<ClusterId>,
    cluster_count: usize,
}

/// Error returned when cluster identifiers are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// The assignments do not include cluster `0`.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The assignments skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
    /// The assignments require identifiers beyond the host pointer width.
    #[error("cluster identifiers exceed the host pointer-width limit")]
    Overflow,
}

impl ClusteringResult {
    /// Wraps labels already known to be contiguous from zero, as produced
    /// by a dendrogram replay.
    pub(crate) fn from_labels(labels: Vec<usize>) -> Self {
        let cluster_count = labels.iter().max().map_or(0, |max| max + 1);
        Self {
            assignments: labels
                .into_iter()
                .map(|label| ClusterId::new(label as u64))
                .collect(),
            cluster_count,
        }
    }

    /// Attempts to build a result from cluster assignments.
    ///
    /// The identifiers used must form the range `0..k` for some `k`; an
    /// empty vector yields `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::MissingZero`] when cluster `0` is
    /// absent, [`NonContiguousClusterIds::Gap`] when identifiers skip
    /// values, and [`NonContiguousClusterIds::Overflow`] when an identifier
    /// does not fit in `usize`.
    pub fn try_from_assignments(
        assignments: Vec<ClusterId>,
    ) -> Result<Self, NonContiguousClusterIds> {
        if assignments.is_empty() {
            return Ok(Self {
                assignments,
                cluster_count: 0,
            });
        }

        // Ids at or beyond the item count cannot be part of a contiguous run.
        let mut seen = vec![false; assignments.len()];
        let mut highest = 0;
        let mut out_of_range = false;
        for id in &assignments {
            let index =
                usize::try_from(id.get()).map_err(|_| NonContiguousClusterIds::Overflow)?;
            match seen.get_mut(index) {
                Some(slot) => *slot = true,
                None => out_of_range = true,
            }
            highest = highest.max(index);
        }

        if !seen.first().copied().unwrap_or(false) {
            return Err(NonContiguousClusterIds::MissingZero);
        }
        seen.truncate(highest + 1);
        if out_of_range || seen.contains(&false) {
            return Err(NonContiguousClusterIds::Gap);
        }

        Ok(Self {
            cluster_count: seen.len(),
            assignments,
        })
    }

    /// Returns the assignments in point order.
    #[must_use]
    pub fn assignments(&self) -> &[ClusterId] {
        &self.assignments
    }

    /// Returns the assignments as plain indices in point order.
    pub fn labels(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.assignments.iter().map(|id| id.get() as usize)
    }

    /// Counts how many distinct clusters exist within the assignments.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Returns the number of points in each cluster, indexed by cluster id.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count];
        for label in self.labels() {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }

    /// Returns the points assigned to `cluster`, in ascending order.
    #[must_use]
    pub fn members(&self, cluster: ClusterId) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter_map(|(point, id)| (*id == cluster).then_some(point))
            .collect()
    }
}

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use nnchain_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ids(values: &[u64]) -> Vec<ClusterId> {
        values.iter().copied().map(ClusterId::new).collect()
    }

    #[rstest]
    #[case(&[0, 1, 1, 2], 3)]
    #[case(&[2, 0, 1], 3)]
    #[case(&[0, 0, 0], 1)]
    #[case(&[], 0)]
    fn accepts_contiguous_ids(#[case] values: &[u64], #[case] expected: usize) {
        let result = ClusteringResult::try_from_assignments(ids(values)).expect("contiguous");
        assert_eq!(result.cluster_count(), expected);
    }

    #[rstest]
    #[case(&[1, 2], NonContiguousClusterIds::MissingZero)]
    #[case(&[0, 2, 2], NonContiguousClusterIds::Gap)]
    #[case(&[0, 7], NonContiguousClusterIds::Gap)]
    fn rejects_non_contiguous_ids(
        #[case] values: &[u64],
        #[case] expected: NonContiguousClusterIds,
    ) {
        assert_eq!(
            ClusteringResult::try_from_assignments(ids(values)),
            Err(expected)
        );
    }

    #[test]
    fn members_and_sizes_follow_labels() {
        let result = ClusteringResult::from_labels(vec![1, 0, 1, 2, 1]);
        assert_eq!(result.cluster_count(), 3);
        assert_eq!(result.cluster_sizes(), vec![1, 3, 1]);
        assert_eq!(result.members(ClusterId::new(1)), vec![0, 2, 4]);
        assert!(result.members(ClusterId::new(9)).is_empty());
    }
}
