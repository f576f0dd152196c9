//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of `.expect()`.

use crate::source::SyntheticError;
use nnchain_core::{DendrogramError, NnChainError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Building or running the clustering failed.
    #[error("clustering failed: {0}")]
    NnChain(#[from] NnChainError),
    /// Querying a prepared hierarchy failed.
    #[error("dendrogram query failed: {0}")]
    Dendrogram(#[from] DendrogramError),
}
