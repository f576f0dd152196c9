//! Synthetic benchmark data sources.
//!
//! Seeded generators for uniform noise, separated Gaussian blobs with
//! ground-truth labels, and a noisy ring that stresses chaining behaviour.

mod errors;
mod numeric;

pub use errors::SyntheticError;
pub use numeric::{GaussianBlobConfig, RingConfig, SyntheticConfig, SyntheticSource};
