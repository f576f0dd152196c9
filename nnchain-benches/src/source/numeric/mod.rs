//! Numeric synthetic data generators for benchmarking.

mod generation;

use crate::source::SyntheticError;
use generation::{
    blob_centroids, ring_point, standard_normal_sample, validate_blob_config, validate_ring_config,
};
use nnchain_core::{DataSource, DataSourceError};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Uniform random vector configuration.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Configuration for isotropic Gaussian blobs.
#[derive(Clone, Debug)]
pub struct GaussianBlobConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// Number of Gaussian clusters.
    pub cluster_count: usize,
    /// Radius of the circle the centroids are spread over.
    pub separation: f32,
    /// Standard deviation of every coordinate around its centroid.
    pub spread: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Configuration for a noisy ring in the first two coordinates.
#[derive(Clone, Debug)]
pub struct RingConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector; at least two.
    pub dimensions: usize,
    /// Ring radius.
    pub radius: f32,
    /// Standard deviation of the radial and off-plane noise.
    pub noise: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A numeric synthetic [`DataSource`] using Euclidean distance.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    data: Vec<f32>,
    point_count: usize,
    dimensions: usize,
    name: &'static str,
}

impl SyntheticSource {
    /// Generates uniform random vectors in `[0.0, 1.0)`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        let total = checked_total(config.point_count, config.dimensions)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let data = (0..total).map(|_| rng.gen_range(0.0_f32..1.0_f32)).collect();
        Self::from_parts("synthetic-uniform", data, config.point_count, config.dimensions)
    }

    /// Generates Gaussian blobs and the blob index of every point.
    ///
    /// Points are dealt to blobs round-robin, so point `i` belongs to blob
    /// `i % cluster_count`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    #[expect(
        clippy::float_arithmetic,
        reason = "Gaussian sampling requires floating-point arithmetic"
    )]
    pub fn generate_gaussian_blobs(
        config: &GaussianBlobConfig,
    ) -> Result<(Self, Vec<usize>), SyntheticError> {
        let total = checked_total(config.point_count, config.dimensions)?;
        validate_blob_config(config)?;

        let centroids = blob_centroids(config);
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut data = Vec::with_capacity(total);
        let mut labels = Vec::with_capacity(config.point_count);
        for (label, centroid) in centroids
            .iter()
            .enumerate()
            .cycle()
            .take(config.point_count)
        {
            labels.push(label);
            for coordinate in centroid {
                data.push(coordinate + standard_normal_sample(&mut rng)? * config.spread);
            }
        }

        let source = Self::from_parts(
            "synthetic-gaussian-blobs",
            data,
            config.point_count,
            config.dimensions,
        )?;
        Ok((source, labels))
    }

    /// Generates a noisy ring, a worst case for chain length under single
    /// linkage.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    pub fn generate_ring(config: &RingConfig) -> Result<Self, SyntheticError> {
        let total = checked_total(config.point_count, config.dimensions)?;
        validate_ring_config(config)?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut data = Vec::with_capacity(total);
        for _ in 0..config.point_count {
            data.extend(ring_point(config, &mut rng)?);
        }
        Self::from_parts("synthetic-ring", data, config.point_count, config.dimensions)
    }

    /// Returns the dimensionality of each vector.
    #[must_use]
    #[rustfmt::skip]
    pub const fn dimensions(&self) -> usize { self.dimensions }

    fn from_parts(
        name: &'static str,
        data: Vec<f32>,
        point_count: usize,
        dimensions: usize,
    ) -> Result<Self, SyntheticError> {
        if data.len() != checked_total(point_count, dimensions)? {
            return Err(SyntheticError::InvalidFloatParameter {
                parameter: "data.len()",
            });
        }
        Ok(Self {
            data,
            point_count,
            dimensions,
            name,
        })
    }

    fn row(&self, index: usize) -> Result<&[f32], DataSourceError> {
        let start = index
            .checked_mul(self.dimensions)
            .ok_or(DataSourceError::OutOfBounds { index })?;
        let end = start
            .checked_add(self.dimensions)
            .ok_or(DataSourceError::OutOfBounds { index })?;
        self.data
            .get(start..end)
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

impl DataSource for SyntheticSource {
    #[rustfmt::skip]
    fn len(&self) -> usize { self.point_count }

    #[rustfmt::skip]
    fn name(&self) -> &str { self.name }

    #[expect(
        clippy::float_arithmetic,
        reason = "Euclidean distance requires floating-point arithmetic"
    )]
    fn distance(&self, left: usize, right: usize) -> Result<f32, DataSourceError> {
        let sum_sq = self
            .row(left)?
            .iter()
            .zip(self.row(right)?)
            .fold(0.0_f32, |acc, (lhs, rhs)| {
                let diff = lhs - rhs;
                acc + diff * diff
            });
        Ok(sum_sq.sqrt())
    }
}

const fn checked_total(point_count: usize, dimensions: usize) -> Result<usize, SyntheticError> {
    if point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions);
    }
    match point_count.checked_mul(dimensions) {
        Some(total) => Ok(total),
        None => Err(SyntheticError::Overflow),
    }
}
