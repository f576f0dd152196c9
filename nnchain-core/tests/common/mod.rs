//! Synthetic sources shared by the integration suites.

use nnchain_core::{DataSource, DataSourceError, DenseSource};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// One-dimensional source measuring absolute differences.
#[derive(Clone)]
pub struct Line {
    values: Vec<f32>,
}

impl Line {
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }
}

impl DataSource for Line {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn name(&self) -> &str {
        "line"
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
        let a = self
            .values
            .get(i)
            .ok_or(DataSourceError::OutOfBounds { index: i })?;
        let b = self
            .values
            .get(j)
            .ok_or(DataSourceError::OutOfBounds { index: j })?;
        Ok((a - b).abs())
    }
}

/// Isotropic Gaussian blobs in the plane, emitted blob by blob.
pub struct Blobs {
    pub source: DenseSource,
    /// Index of the generating blob for every row.
    pub truth: Vec<usize>,
}

/// Samples `per_blob` points around each centre with standard deviation
/// `sigma`.
#[must_use]
pub fn gaussian_blobs(centres: &[[f32; 2]], per_blob: usize, sigma: f32, seed: u64) -> Blobs {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(centres.len() * per_blob);
    let mut truth = Vec::with_capacity(centres.len() * per_blob);
    for (blob, centre) in centres.iter().enumerate() {
        for _ in 0..per_blob {
            let (dx, dy) = standard_normal_pair(&mut rng);
            rows.push(vec![centre[0] + sigma * dx, centre[1] + sigma * dy]);
            truth.push(blob);
        }
    }
    let source = DenseSource::try_new("blobs", rows).expect("blob rows are valid");
    Blobs { source, truth }
}

/// Points sampled uniformly in the unit square.
#[must_use]
pub fn uniform_square(len: usize, seed: u64) -> DenseSource {
    let mut rng = SmallRng::seed_from_u64(seed);
    let rows = (0..len)
        .map(|_| vec![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect();
    DenseSource::try_new("uniform", rows).expect("uniform rows are valid")
}

/// Box-Muller transform.
fn standard_normal_pair(rng: &mut SmallRng) -> (f32, f32) {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen_range(0.0..1.0);
    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = std::f32::consts::TAU * u2;
    (radius * angle.cos(), radius * angle.sin())
}
