//! Benchmark parameter types rendered into Criterion benchmark ids.

use std::fmt;

use nnchain_core::{ExecutionStrategy, Linkage};

/// Parameters for a full hierarchy build.
#[derive(Clone, Copy, Debug)]
pub struct ChainBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Linkage rule under test.
    pub linkage: Linkage,
    /// Sequential or parallel engine.
    pub strategy: ExecutionStrategy,
}

impl fmt::Display for ChainBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            ExecutionStrategy::Auto => "auto",
            ExecutionStrategy::Sequential => "seq",
            ExecutionStrategy::Parallel => "par",
        };
        write!(f, "n={},{},{strategy}", self.point_count, self.linkage)
    }
}

/// Parameters for re-querying a prepared dendrogram.
#[derive(Clone, Copy, Debug)]
pub struct RequeryBenchParams {
    /// Number of points covered by the dendrogram.
    pub point_count: usize,
    /// Number of flat clusters requested.
    pub cluster_count: usize,
}

impl fmt::Display for RequeryBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},k={}", self.point_count, self.cluster_count)
    }
}
