//! Tests for nearest-neighbour chain fitting and flat clustering.

mod property;

use crate::{DenseSource, NnChain, builder::NnChainBuilder, linkage::Linkage};

pub(super) fn line(name: &str, values: &[f32]) -> DenseSource {
    DenseSource::try_new(name, values.iter().map(|&value| vec![value]).collect())
        .expect("line data is valid")
}

pub(super) fn nn_chain(linkage: Linkage) -> NnChain {
    NnChainBuilder::new()
        .with_linkage(linkage)
        .build()
        .expect("configuration is valid")
}
