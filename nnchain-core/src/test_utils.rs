//! Shared test utilities for `nnchain-core`.

use nnchain_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{datasource::DataSource, error::DataSourceError};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `NNCHAIN_PBT_CASES` and
/// `NNCHAIN_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// One-dimensional [`DataSource`] that counts distance invocations.
#[derive(Clone)]
pub(crate) struct CountingSource {
    data: Vec<f32>,
    calls: Arc<AtomicUsize>,
    name: &'static str,
}

impl CountingSource {
    #[must_use]
    pub(crate) fn new(data: Vec<f32>, calls: Arc<AtomicUsize>) -> Self {
        Self {
            data,
            calls,
            name: "counting",
        }
    }

    /// Number of distance evaluations so far.
    #[must_use]
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl DataSource for CountingSource {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn name(&self) -> &str {
        self.name
    }

    fn distance(&self, left: usize, right: usize) -> Result<f32, DataSourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let a = self
            .data
            .get(left)
            .ok_or(DataSourceError::OutOfBounds { index: left })?;
        let b = self
            .data
            .get(right)
            .ok_or(DataSourceError::OutOfBounds { index: right })?;
        Ok((a - b).abs())
    }
}

/// [`DataSource`] whose distance fails once either index reaches `fail_from`.
#[derive(Clone, Debug)]
pub(crate) struct FailingSource {
    pub(crate) len: usize,
    pub(crate) fail_from: usize,
}

impl DataSource for FailingSource {
    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn distance(&self, left: usize, right: usize) -> Result<f32, DataSourceError> {
        let worst = left.max(right);
        if worst >= self.fail_from {
            return Err(DataSourceError::OutOfBounds { index: worst });
        }
        Ok(left.abs_diff(right) as f32)
    }
}
