//! Benchmark support crate for nnchain.
//!
//! Provides synthetic data sources and parameter types used by the Criterion
//! benchmarks for hierarchy construction and flat-cluster re-queries.

pub mod error;
pub mod params;
pub mod source;
