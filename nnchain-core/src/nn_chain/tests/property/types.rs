//! Fixture types for nearest-neighbour chain property tests.

use test_strategy::Arbitrary;

use crate::{DenseSource, error::DataSourceError, linkage::Linkage};

/// Shape of the generated point cloud.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(super) enum PointLayout {
    /// Points sampled uniformly in a bounding hypercube.
    #[weight(3)]
    Uniform,
    /// Tight groups around well-separated centres.
    #[weight(3)]
    Grouped,
    /// Points strung along one axis with small jitter on the others.
    #[weight(1)]
    Filament,
}

/// Generated point cloud plus the linkage to cluster it with.
#[derive(Clone, Debug)]
pub(super) struct ChainFixture {
    pub(super) layout: PointLayout,
    pub(super) linkage: Linkage,
    pub(super) rows: Vec<Vec<f32>>,
}

impl ChainFixture {
    pub(super) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(super) fn dimension(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub(super) fn to_source(&self) -> Result<DenseSource, DataSourceError> {
        DenseSource::try_new(format!("{:?}", self.layout), self.rows.clone())
    }
}
