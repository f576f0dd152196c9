//! Builder utilities for configuring nearest-neighbour chain clustering.
//!
//! Exposes the execution strategy and cluster-count selection surface, and
//! the validation applied before constructing [`NnChain`] instances.

use std::num::NonZeroUsize;

use crate::{
    Result,
    error::NnChainError,
    linkage::Linkage,
    nn_chain::{DistanceCacheConfig, NnChain},
};

/// Indicates how [`NnChain`] schedules the nearest-neighbour scans and the
/// per-merge dissimilarity updates.
///
/// `Auto` uses the worker pool when the `parallel` feature is compiled in and
/// runs sequentially otherwise, so behaviour stays stable across builds.
/// `Parallel` fails with [`NnChainError::BackendUnavailable`] in builds
/// without the feature.
///
/// # Examples
/// ```
/// use nnchain_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Allow the library to pick the schedule.
    #[default]
    Auto,
    /// Run every scan and update on the calling thread.
    Sequential,
    /// Fan large scans and updates out to the rayon worker pool.
    Parallel,
}

/// How [`NnChain::run`] decides how many clusters to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterCount {
    /// Always cut the hierarchy at this many clusters.
    Exact(NonZeroUsize),
    /// Pick a count within `low..=high` with the jump heuristic. `high` is
    /// clamped to the number of items at run time.
    Range {
        /// Smallest acceptable count.
        low: NonZeroUsize,
        /// Largest acceptable count.
        high: NonZeroUsize,
    },
    /// Pick a count within `2..=max(2, isqrt(items))` with the jump
    /// heuristic.
    #[default]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterRequest {
    Exact(usize),
    Range(usize, usize),
    Auto,
}

/// Configures and constructs [`NnChain`] instances.
///
/// # Examples
/// ```
/// use nnchain_core::{ExecutionStrategy, Linkage, NnChainBuilder};
///
/// let nn_chain = NnChainBuilder::new()
///     .with_linkage(Linkage::Average)
///     .with_cluster_count(3)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(nn_chain.linkage(), Linkage::Average);
/// assert_eq!(nn_chain.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone)]
pub struct NnChainBuilder {
    linkage: Linkage,
    cluster_count: ClusterRequest,
    execution_strategy: ExecutionStrategy,
    distance_cache: Option<DistanceCacheConfig>,
}

impl Default for NnChainBuilder {
    fn default() -> Self {
        Self {
            linkage: Linkage::Ward,
            cluster_count: ClusterRequest::Auto,
            execution_strategy: ExecutionStrategy::Auto,
            distance_cache: None,
        }
    }
}

impl NnChainBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::{ExecutionStrategy, Linkage, NnChainBuilder};
    ///
    /// let builder = NnChainBuilder::new();
    /// assert_eq!(builder.linkage(), Linkage::Ward);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// assert!(builder.distance_cache().is_none());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the linkage rule used to update dissimilarities after a merge.
    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Returns the configured linkage rule.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Requests an exact number of clusters from [`NnChain::run`].
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::NnChainBuilder;
    ///
    /// assert!(NnChainBuilder::new().with_cluster_count(0).build().is_err());
    /// ```
    #[must_use]
    pub fn with_cluster_count(mut self, clusters: usize) -> Self {
        self.cluster_count = ClusterRequest::Exact(clusters);
        self
    }

    /// Lets [`NnChain::run`] choose a count within `low..=high`.
    #[must_use]
    pub fn with_cluster_range(mut self, low: usize, high: usize) -> Self {
        self.cluster_count = ClusterRequest::Range(low, high);
        self
    }

    /// Restores the default automatic cluster-count window.
    #[must_use]
    pub fn with_automatic_cluster_count(mut self) -> Self {
        self.cluster_count = ClusterRequest::Auto;
        self
    }

    /// Sets the execution strategy to use when running the algorithm.
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::{ExecutionStrategy, NnChainBuilder};
    ///
    /// let builder = NnChainBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Memoizes point distances in a bounded cache; `None` disables it.
    ///
    /// Useful when [`crate::DataSource::distance`] is expensive, since the
    /// chain asks for the same pair more than once before either point is
    /// merged.
    #[must_use]
    pub fn with_distance_cache(mut self, config: Option<DistanceCacheConfig>) -> Self {
        self.distance_cache = config;
        self
    }

    /// Returns the distance cache configuration, if any.
    #[must_use]
    pub fn distance_cache(&self) -> Option<DistanceCacheConfig> {
        self.distance_cache
    }

    /// Validates the configuration and constructs an [`NnChain`] instance.
    ///
    /// # Errors
    /// Returns [`NnChainError::InvalidClusterCount`] for an exact count of
    /// zero and [`NnChainError::InvalidClusterRange`] when a range starts at
    /// zero or `low > high`.
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::{ClusterCount, NnChainBuilder};
    ///
    /// let nn_chain = NnChainBuilder::new().with_cluster_range(2, 6).build()?;
    /// assert!(matches!(nn_chain.cluster_count(), ClusterCount::Range { .. }));
    /// assert!(NnChainBuilder::new().with_cluster_range(5, 2).build().is_err());
    /// # Ok::<(), nnchain_core::NnChainError>(())
    /// ```
    pub fn build(self) -> Result<NnChain> {
        let cluster_count = match self.cluster_count {
            ClusterRequest::Exact(clusters) => NonZeroUsize::new(clusters)
                .map(ClusterCount::Exact)
                .ok_or(NnChainError::InvalidClusterCount { got: clusters })?,
            ClusterRequest::Range(low, high) => {
                let invalid = NnChainError::InvalidClusterRange { low, high };
                match (NonZeroUsize::new(low), NonZeroUsize::new(high)) {
                    (Some(low), Some(high)) if low <= high => ClusterCount::Range { low, high },
                    _ => return Err(invalid),
                }
            }
            ClusterRequest::Auto => ClusterCount::Auto,
        };

        Ok(NnChain::new(
            self.linkage,
            cluster_count,
            self.execution_strategy,
            self.distance_cache,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_to_ward_with_automatic_count() {
        let nn_chain = NnChainBuilder::new().build().expect("defaults are valid");
        assert_eq!(nn_chain.linkage(), Linkage::Ward);
        assert_eq!(nn_chain.cluster_count(), ClusterCount::Auto);
        assert_eq!(nn_chain.execution_strategy(), ExecutionStrategy::Auto);
        assert!(nn_chain.distance_cache().is_none());
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    fn accepts_positive_counts(#[case] clusters: usize) {
        let nn_chain = NnChainBuilder::new()
            .with_cluster_count(clusters)
            .build()
            .expect("count is valid");
        assert_eq!(
            nn_chain.cluster_count(),
            ClusterCount::Exact(NonZeroUsize::new(clusters).expect("non-zero"))
        );
    }

    #[test]
    fn rejects_zero_count() {
        let err = NnChainBuilder::new()
            .with_cluster_count(0)
            .build()
            .expect_err("zero clusters must be rejected");
        assert_eq!(err, NnChainError::InvalidClusterCount { got: 0 });
    }

    #[rstest]
    #[case(0, 4)]
    #[case(3, 2)]
    #[case(0, 0)]
    fn rejects_invalid_ranges(#[case] low: usize, #[case] high: usize) {
        let err = NnChainBuilder::new()
            .with_cluster_range(low, high)
            .build()
            .expect_err("range must be rejected");
        assert_eq!(err, NnChainError::InvalidClusterRange { low, high });
    }

    #[test]
    fn last_count_request_wins() {
        let nn_chain = NnChainBuilder::new()
            .with_cluster_count(3)
            .with_automatic_cluster_count()
            .build()
            .expect("automatic count is valid");
        assert_eq!(nn_chain.cluster_count(), ClusterCount::Auto);
    }

    #[test]
    fn keeps_distance_cache_config() {
        let config = DistanceCacheConfig::new(NonZeroUsize::new(64).expect("non-zero"));
        let nn_chain = NnChainBuilder::new()
            .with_distance_cache(Some(config))
            .build()
            .expect("cache config is valid");
        assert_eq!(nn_chain.distance_cache(), Some(config));
    }
}
