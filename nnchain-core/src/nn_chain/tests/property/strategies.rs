//! Strategy builders for nearest-neighbour chain property tests.

use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};

use super::types::{ChainFixture, PointLayout};
use crate::linkage::{LanceWilliams, Linkage};

const MIN_POINTS: usize = 2;
const MAX_POINTS: usize = 48;
const MAX_DIMENSION: usize = 4;
const BOUND: f32 = 100.0;

/// Fixtures clustered with any of the built-in linkages.
pub(super) fn chain_fixture_strategy() -> impl Strategy<Value = ChainFixture> {
    fixture_strategy(proptest::sample::select(Linkage::ALL.to_vec()))
}

/// Fixtures restricted to linkages the chain reproduces exactly.
pub(super) fn reducible_fixture_strategy() -> impl Strategy<Value = ChainFixture> {
    let reducible: Vec<Linkage> = Linkage::ALL
        .into_iter()
        .filter(|linkage| linkage.is_reducible())
        .collect();
    fixture_strategy(proptest::sample::select(reducible))
}

fn fixture_strategy(
    linkage: impl Strategy<Value = Linkage>,
) -> impl Strategy<Value = ChainFixture> {
    (
        any::<PointLayout>(),
        linkage,
        MIN_POINTS..=MAX_POINTS,
        1..=MAX_DIMENSION,
        any::<u64>(),
    )
        .prop_map(|(layout, linkage, len, dimension, seed)| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let rows = match layout {
                PointLayout::Uniform => uniform_rows(&mut rng, len, dimension),
                PointLayout::Grouped => grouped_rows(&mut rng, len, dimension),
                PointLayout::Filament => filament_rows(&mut rng, len, dimension),
            };
            ChainFixture {
                layout,
                linkage,
                rows,
            }
        })
}

fn uniform_rows(rng: &mut SmallRng, len: usize, dimension: usize) -> Vec<Vec<f32>> {
    (0..len)
        .map(|_| (0..dimension).map(|_| rng.gen_range(-BOUND..BOUND)).collect())
        .collect()
}

fn grouped_rows(rng: &mut SmallRng, len: usize, dimension: usize) -> Vec<Vec<f32>> {
    let groups = rng.gen_range(1..=4_usize);
    let centres: Vec<Vec<f32>> = (0..groups)
        .map(|_| (0..dimension).map(|_| rng.gen_range(-BOUND..BOUND)).collect())
        .collect();
    (0..len)
        .map(|index| {
            centres[index % groups]
                .iter()
                .map(|&centre| centre + rng.gen_range(-2.0..2.0))
                .collect()
        })
        .collect()
}

fn filament_rows(rng: &mut SmallRng, len: usize, dimension: usize) -> Vec<Vec<f32>> {
    (0..len)
        .map(|_| {
            let mut row = vec![rng.gen_range(-BOUND..BOUND)];
            row.extend((1..dimension).map(|_| rng.gen_range(-0.5..0.5)));
            row
        })
        .collect()
}
