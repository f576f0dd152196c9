//! Clustering orchestration for the nearest-neighbour chain.
//!
//! Provides the [`NnChain`] runtime entry point: precondition checks,
//! execution-strategy resolution, the engine run, and the cluster-count
//! decision that turns a [`Dendrogram`] into a flat [`ClusteringResult`].

mod distance_cache;
mod engine;
mod store;

use std::sync::Arc;

use tracing::{info, instrument, warn};

pub use self::distance_cache::DistanceCacheConfig;
use self::{
    distance_cache::DistanceCache,
    engine::{Engine, EngineConfig},
};
use crate::{
    Result,
    builder::{ClusterCount, ExecutionStrategy},
    datasource::DataSource,
    dendrogram::Dendrogram,
    error::{DataSourceError, NnChainError},
    linkage::{LanceWilliams, Linkage},
    result::ClusteringResult,
};

/// Cluster-count decision resolved against a concrete item count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Exact(usize),
    Range { low: usize, high: usize },
}

/// Entry point for nearest-neighbour chain clustering.
///
/// # Examples
/// ```
/// use nnchain_core::{DataSource, DataSourceError, Linkage, NnChainBuilder};
///
/// struct Line(Vec<f32>);
///
/// impl DataSource for Line {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
///         let a = self.0.get(i).ok_or(DataSourceError::OutOfBounds { index: i })?;
///         let b = self.0.get(j).ok_or(DataSourceError::OutOfBounds { index: j })?;
///         Ok((a - b).abs())
///     }
/// }
///
/// let nn_chain = NnChainBuilder::new()
///     .with_linkage(Linkage::Complete)
///     .with_cluster_count(2)
///     .build()?;
/// let result = nn_chain.run(&Line(vec![0.0, 0.2, 0.4, 9.0, 9.3]))?;
/// assert_eq!(result.labels().collect::<Vec<_>>(), vec![0, 0, 0, 1, 1]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct NnChain {
    linkage: Linkage,
    cluster_count: ClusterCount,
    execution_strategy: ExecutionStrategy,
    distance_cache: Option<DistanceCacheConfig>,
    parallel_threshold: Option<usize>,
}

impl NnChain {
    pub(crate) fn new(
        linkage: Linkage,
        cluster_count: ClusterCount,
        execution_strategy: ExecutionStrategy,
        distance_cache: Option<DistanceCacheConfig>,
    ) -> Self {
        Self {
            linkage,
            cluster_count,
            execution_strategy,
            distance_cache,
            parallel_threshold: None,
        }
    }

    /// Forces fan-out once the active set holds at least `threshold`
    /// clusters, so small inputs exercise the parallel paths in tests.
    #[cfg(test)]
    pub(crate) fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    /// Returns the linkage rule applied by [`Self::fit`] and [`Self::run`].
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Returns how [`Self::run`] chooses the number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> ClusterCount {
        self.cluster_count
    }

    /// Returns the execution strategy that will be used when running.
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::{ExecutionStrategy, NnChainBuilder};
    ///
    /// let nn_chain = NnChainBuilder::new()
    ///     .with_execution_strategy(ExecutionStrategy::Sequential)
    ///     .build()
    ///     .expect("builder must apply execution strategy");
    /// assert_eq!(nn_chain.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Returns the point-distance cache configuration, if any.
    #[must_use]
    pub fn distance_cache(&self) -> Option<DistanceCacheConfig> {
        self.distance_cache
    }

    /// Clusters `source` and cuts the hierarchy at the configured count.
    ///
    /// With [`ClusterCount::Exact`] the count is used as given; otherwise the
    /// jump heuristic picks one from the configured window.
    ///
    /// # Errors
    /// Returns [`NnChainError::EmptySource`] or
    /// [`NnChainError::InsufficientItems`] when `source` holds fewer than
    /// two items, [`NnChainError::ClusterCountExceedsItems`] when the
    /// requested count cannot be met, [`NnChainError::BackendUnavailable`]
    /// when the requested strategy is not compiled in, and
    /// [`NnChainError::DataSource`] when a distance evaluation fails. Every
    /// check except the last runs before any distance is evaluated.
    pub fn run<D: DataSource + Sync>(&self, source: &D) -> Result<ClusteringResult> {
        let items = source.len();
        self.run_with_len(source, items)
    }

    #[instrument(
        name = "nnchain.run",
        err,
        skip(self, source),
        fields(
            data_source = %source.name(),
            items = items,
            linkage = %self.linkage,
            strategy = ?self.execution_strategy
        ),
    )]
    fn run_with_len<D: DataSource + Sync>(
        &self,
        source: &D,
        items: usize,
    ) -> Result<ClusteringResult> {
        ensure_clusterable(source, items)?;
        let target = self.resolve_target(items)?;
        let parallel = self.resolve_parallel()?;

        let dendrogram = self.fit_checked(source, &self.linkage, items, parallel)?;
        let clusters = match target {
            Target::Exact(clusters) => clusters,
            Target::Range { low, high } => dendrogram.select_cluster_count(low, high)?,
        };
        let result = dendrogram.assign(clusters)?;
        info!(clusters, "clustering completed");
        Ok(result)
    }

    /// Builds the full merge hierarchy for `source` with the configured
    /// linkage.
    ///
    /// # Errors
    /// Returns [`NnChainError::EmptySource`],
    /// [`NnChainError::InsufficientItems`],
    /// [`NnChainError::BackendUnavailable`], or
    /// [`NnChainError::DataSource`] as described for [`Self::run`].
    pub fn fit<D: DataSource + Sync>(&self, source: &D) -> Result<Dendrogram> {
        self.fit_with(source, &self.linkage)
    }

    /// Builds the full merge hierarchy for `source` with a caller-supplied
    /// update rule instead of the configured linkage.
    ///
    /// Rules that report `is_reducible() == false` are accepted with a
    /// warning; their merge set may differ from exhaustive agglomeration.
    ///
    /// # Errors
    /// Same as [`Self::fit`].
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::{DenseSource, LanceWilliams, NnChainBuilder};
    ///
    /// struct Farthest;
    ///
    /// impl LanceWilliams for Farthest {
    ///     fn alpha(&self, _: usize, _: usize, _: usize) -> f64 { 0.5 }
    ///     fn beta(&self, _: usize, _: usize, _: usize) -> f64 { 0.0 }
    ///     fn gamma(&self, _: usize, _: usize, _: usize) -> f64 { 0.5 }
    ///     fn is_reducible(&self) -> bool { true }
    /// }
    ///
    /// let source = DenseSource::try_new("grid", vec![vec![0.0], vec![1.0], vec![3.0]])?;
    /// let dendrogram = NnChainBuilder::new().build()?.fit_with(&source, &Farthest)?;
    /// assert_eq!(dendrogram.distances().collect::<Vec<_>>(), vec![1.0, 3.0]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn fit_with<D, L>(&self, source: &D, rule: &L) -> Result<Dendrogram>
    where
        D: DataSource + Sync,
        L: LanceWilliams,
    {
        let items = source.len();
        ensure_clusterable(source, items)?;
        let parallel = self.resolve_parallel()?;
        self.fit_checked(source, rule, items, parallel)
    }

    #[instrument(
        name = "nnchain.fit",
        err,
        skip(self, source, rule),
        fields(
            data_source = %source.name(),
            items = items,
            linkage = %rule.name(),
            parallel = parallel
        ),
    )]
    fn fit_checked<D, L>(
        &self,
        source: &D,
        rule: &L,
        items: usize,
        parallel: bool,
    ) -> Result<Dendrogram>
    where
        D: DataSource + Sync,
        L: LanceWilliams,
    {
        if !rule.is_reducible() {
            warn!(
                linkage = rule.name(),
                "linkage is not reducible; the hierarchy may differ from exhaustive agglomeration"
            );
        }

        let cache = self.distance_cache.map(DistanceCache::new);
        let config = EngineConfig {
            parallel,
            parallel_threshold: self.parallel_threshold,
        };
        let outcome = Engine::new(source, rule, cache.as_ref(), config)
            .run()
            .map_err(|error| wrap_datasource_error(source, error))?;

        info!(
            merges = outcome.merges.len(),
            evaluations = outcome.evaluations,
            chain_extensions = outcome.chain_extensions,
            "nearest-neighbour chain completed"
        );
        Ok(Dendrogram::from_discovery(items, outcome.merges))
    }

    fn resolve_target(&self, items: usize) -> Result<Target> {
        let exceeds = |requested| NnChainError::ClusterCountExceedsItems { requested, items };
        match self.cluster_count {
            ClusterCount::Exact(clusters) if clusters.get() > items => Err(exceeds(clusters.get())),
            ClusterCount::Exact(clusters) => Ok(Target::Exact(clusters.get())),
            ClusterCount::Range { low, .. } if low.get() > items => Err(exceeds(low.get())),
            ClusterCount::Range { low, high } => Ok(Target::Range {
                low: low.get(),
                high: high.get().min(items),
            }),
            ClusterCount::Auto => Ok(Target::Range {
                low: 2,
                high: items.isqrt().max(2).min(items),
            }),
        }
    }

    fn resolve_parallel(&self) -> Result<bool> {
        match self.execution_strategy {
            ExecutionStrategy::Sequential => Ok(false),
            ExecutionStrategy::Auto => Ok(cfg!(feature = "parallel")),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Parallel => Ok(true),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => Err(NnChainError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            }),
        }
    }
}

fn ensure_clusterable<D: DataSource>(source: &D, items: usize) -> Result<()> {
    if items == 0 {
        warn!(
            data_source = source.name(),
            "data source is empty, returning error"
        );
        return Err(NnChainError::EmptySource {
            data_source: Arc::from(source.name()),
        });
    }
    if items < 2 {
        return Err(NnChainError::InsufficientItems {
            data_source: Arc::from(source.name()),
            items,
        });
    }
    Ok(())
}

fn wrap_datasource_error<D: DataSource>(source: &D, error: DataSourceError) -> NnChainError {
    NnChainError::DataSource {
        data_source: Arc::from(source.name()),
        error,
    }
}

#[cfg(test)]
mod tests;
