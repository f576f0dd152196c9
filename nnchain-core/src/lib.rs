//! Nearest-neighbour chain hierarchical clustering.
//!
//! Builds a complete agglomerative hierarchy in quadratic time by following
//! chains of nearest neighbours until two clusters are reciprocal nearest
//! neighbours, merging them, and updating dissimilarities with a
//! Lance-Williams rule. The resulting [`Dendrogram`] can be cut into any
//! number of flat clusters without re-running the algorithm.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod datasource;
mod dendrogram;
mod dense;
mod error;
mod linkage;
mod nn_chain;
mod result;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{ClusterCount, ExecutionStrategy, NnChainBuilder},
    datasource::DataSource,
    dendrogram::{Dendrogram, LinkageRow, Merge},
    dense::DenseSource,
    error::{
        DataSourceError, DataSourceErrorCode, DendrogramError, DendrogramErrorCode, NnChainError,
        NnChainErrorCode, Result,
    },
    linkage::{LanceWilliams, Linkage, ParseLinkageError},
    nn_chain::{DistanceCacheConfig, NnChain},
    result::{ClusterId, ClusteringResult, NonContiguousClusterIds},
};
