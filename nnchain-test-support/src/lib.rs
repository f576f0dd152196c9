//! Shared test utilities used across nnchain crates.

pub mod ci;
pub mod tracing;
