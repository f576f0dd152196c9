//! Numeric generator helper routines.

use super::{GaussianBlobConfig, RingConfig};
use crate::source::SyntheticError;
use rand::{Rng, rngs::SmallRng};
use std::f32::consts::PI;

pub(super) fn validate_blob_config(config: &GaussianBlobConfig) -> Result<(), SyntheticError> {
    if config.cluster_count == 0 {
        return Err(SyntheticError::ZeroClusters);
    }
    if config.cluster_count > config.point_count {
        return Err(SyntheticError::ClusterCountExceedsPointCount {
            cluster_count: config.cluster_count,
            point_count: config.point_count,
        });
    }
    validate_float_param(config.separation, "separation", false)?;
    validate_float_param(config.spread, "spread", true)
}

pub(super) fn validate_ring_config(config: &RingConfig) -> Result<(), SyntheticError> {
    if config.dimensions < 2 {
        return Err(SyntheticError::InsufficientRingDimensions {
            actual: config.dimensions,
        });
    }
    validate_float_param(config.radius, "radius", false)?;
    validate_float_param(config.noise, "noise", true)
}

fn validate_float_param(
    value: f32,
    parameter: &'static str,
    allow_zero: bool,
) -> Result<(), SyntheticError> {
    let is_valid = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if is_valid {
        Ok(())
    } else {
        Err(SyntheticError::InvalidFloatParameter { parameter })
    }
}

/// Centroids spaced evenly on a circle of radius `separation` in the first
/// two coordinates; remaining coordinates are zero. One-dimensional configs
/// place the centroids `separation` apart on the line instead.
#[expect(
    clippy::cast_precision_loss,
    reason = "centroid placement uses index-derived floating-point angles"
)]
#[expect(
    clippy::float_arithmetic,
    reason = "centroid placement uses trigonometric expressions"
)]
pub(super) fn blob_centroids(config: &GaussianBlobConfig) -> Vec<Vec<f32>> {
    (0..config.cluster_count)
        .map(|cluster_index| {
            let mut centroid = vec![0.0_f32; config.dimensions];
            if config.dimensions == 1 {
                if let Some(value) = centroid.first_mut() {
                    *value = config.separation * cluster_index as f32;
                }
                return centroid;
            }
            let angle = (cluster_index as f32 / config.cluster_count as f32) * (2.0 * PI);
            if let Some(value) = centroid.get_mut(0) {
                *value = config.separation * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = config.separation * angle.sin();
            }
            centroid
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "sampling ring coordinates requires floating-point arithmetic"
)]
pub(super) fn ring_point(config: &RingConfig, rng: &mut SmallRng) -> Result<Vec<f32>, SyntheticError> {
    let mut point = vec![0.0_f32; config.dimensions];
    let theta = rng.gen_range(0.0_f32..(2.0 * PI));
    let radius = config.radius + standard_normal_sample(rng)? * config.noise;
    if let Some(value) = point.get_mut(0) {
        *value = radius * theta.cos();
    }
    if let Some(value) = point.get_mut(1) {
        *value = radius * theta.sin();
    }
    for value in point.iter_mut().skip(2) {
        *value = standard_normal_sample(rng)? * config.noise;
    }
    Ok(point)
}

#[expect(
    clippy::float_arithmetic,
    reason = "Box-Muller transform requires floating-point arithmetic"
)]
pub(super) fn standard_normal_sample(rng: &mut SmallRng) -> Result<f32, SyntheticError> {
    let u1 = rng.gen_range(0.0_f32..1.0_f32).max(f32::EPSILON);
    let u2 = rng.gen_range(0.0_f32..1.0_f32);
    let sample = (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * PI * u2).cos();
    if sample.is_finite() {
        Ok(sample)
    } else {
        Err(SyntheticError::InvalidFloatParameter {
            parameter: "standard_normal_sample",
        })
    }
}
