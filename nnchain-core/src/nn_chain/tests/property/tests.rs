use proptest::test_runner::{TestCaseError, TestCaseResult, TestRunner};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rstest::rstest;

use super::{
    oracle::exhaustive_dendrogram,
    strategies::{chain_fixture_strategy, reducible_fixture_strategy},
    types::{ChainFixture, PointLayout},
};
use crate::{
    Dendrogram, NnChainBuilder, dendrogram::Merge,
    linkage::{LanceWilliams, Linkage},
    test_utils::suite_proptest_config,
};

const EQUIVALENCE_CASES: u32 = 96;
const SCHEDULE_CASES: u32 = 48;
const HEIGHT_TOLERANCE: f64 = 1e-6;

fn fit(fixture: &ChainFixture, parallel_threshold: Option<usize>) -> Result<Dendrogram, TestCaseError> {
    let source = fixture
        .to_source()
        .map_err(|err| TestCaseError::fail(format!("fixture -> source failed: {err}")))?;
    let mut nn_chain = NnChainBuilder::new()
        .with_linkage(fixture.linkage)
        .build()
        .map_err(|err| TestCaseError::fail(format!("invalid configuration: {err}")))?;
    if let Some(threshold) = parallel_threshold {
        nn_chain = nn_chain.with_parallel_threshold(threshold);
    }
    nn_chain
        .fit(&source)
        .map_err(|err| TestCaseError::fail(format!("fit failed: {err}")))
}

fn check_structure(fixture: &ChainFixture, dendrogram: &Dendrogram) -> TestCaseResult {
    let n = fixture.len();
    let merges = dendrogram.merges();
    if merges.len() != n - 1 {
        return Err(TestCaseError::fail(format!(
            "expected {} merges, got {}",
            n - 1,
            merges.len()
        )));
    }
    if merges.iter().any(|merge| merge.kept() >= merge.removed()) {
        return Err(TestCaseError::fail("merged cluster must keep the lower id"));
    }
    if merges.windows(2).any(|pair| pair[0].distance() > pair[1].distance()) {
        return Err(TestCaseError::fail("merge distances must be sorted"));
    }
    if merges.iter().map(Merge::size).max() != Some(n) {
        return Err(TestCaseError::fail("some merge must cover every point"));
    }
    // Inversions under centroid and median linkage can sort the root merge
    // ahead of smaller ones.
    if fixture.linkage.is_reducible() && merges.last().map(Merge::size) != Some(n) {
        return Err(TestCaseError::fail("final merge must cover every point"));
    }
    for clusters in 1..=n {
        let labels = dendrogram
            .labels(clusters)
            .map_err(|err| TestCaseError::fail(format!("labels({clusters}) failed: {err}")))?;
        let mut next = 0;
        for &label in &labels {
            if label > next {
                return Err(TestCaseError::fail(format!(
                    "labels({clusters}) are not numbered by first appearance: {labels:?}"
                )));
            }
            if label == next {
                next += 1;
            }
        }
        if next != clusters {
            return Err(TestCaseError::fail(format!(
                "labels({clusters}) produced {next} clusters"
            )));
        }
    }
    Ok(())
}

/// Whether the cut leaving `clusters` clusters falls between two merges at
/// the same height, where the partition depends on discovery order.
fn straddles_tie(distances: &[f64], clusters: usize) -> bool {
    let applied = distances.len() + 1 - clusters;
    match (applied.checked_sub(1).and_then(|last| distances.get(last)), distances.get(applied)) {
        (Some(&below), Some(&above)) => {
            (above - below).abs() <= HEIGHT_TOLERANCE * above.abs().max(1.0)
        }
        _ => false,
    }
}

fn compare_with_exhaustive(fixture: &ChainFixture) -> TestCaseResult {
    let source = fixture
        .to_source()
        .map_err(|err| TestCaseError::fail(format!("fixture -> source failed: {err}")))?;
    let chain = fit(fixture, None)?;
    check_structure(fixture, &chain)?;
    let reference = exhaustive_dendrogram(&source, &fixture.linkage)
        .map_err(|err| TestCaseError::fail(format!("reference failed: {err}")))?;

    for (index, (actual, expected)) in chain.distances().zip(reference.distances()).enumerate() {
        let scale = expected.abs().max(1.0);
        if (actual - expected).abs() > HEIGHT_TOLERANCE * scale {
            return Err(TestCaseError::fail(format!(
                "{:?}: merge {index} at {actual}, reference {expected}",
                fixture.linkage
            )));
        }
    }
    let distances: Vec<f64> = chain.distances().collect();
    for clusters in 1..=fixture.len() {
        if straddles_tie(&distances, clusters) {
            continue;
        }
        let actual = chain.labels(clusters).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let expected = reference
            .labels(clusters)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        if actual != expected {
            return Err(TestCaseError::fail(format!(
                "{:?}: partitions differ at k={clusters}: {actual:?} vs {expected:?}",
                fixture.linkage
            )));
        }
    }
    Ok(())
}

fn compare_schedules(fixture: &ChainFixture) -> TestCaseResult {
    let sequential = fit(fixture, None)?;
    check_structure(fixture, &sequential)?;
    let fanned_out = fit(fixture, Some(2))?;
    if fanned_out != sequential {
        return Err(TestCaseError::fail(format!(
            "{:?}: fanned-out fit diverged from the sequential fit",
            fixture.linkage
        )));
    }
    Ok(())
}

#[test]
fn chain_matches_exhaustive_agglomeration() {
    let mut runner = TestRunner::new(suite_proptest_config(EQUIVALENCE_CASES));
    runner
        .run(&reducible_fixture_strategy(), |fixture| {
            compare_with_exhaustive(&fixture)
        })
        .expect("chain must reproduce exhaustive agglomeration");
}

#[test]
fn fan_out_does_not_change_the_hierarchy() {
    let mut runner = TestRunner::new(suite_proptest_config(SCHEDULE_CASES));
    runner
        .run(&chain_fixture_strategy(), |fixture| compare_schedules(&fixture))
        .expect("fanned-out fits must match sequential fits");
}

#[rstest]
#[case::single(Linkage::Single, 11)]
#[case::complete(Linkage::Complete, 12)]
#[case::average(Linkage::Average, 13)]
#[case::weighted(Linkage::Weighted, 14)]
#[case::ward(Linkage::Ward, 15)]
fn seeded_plane_matches_exhaustive_agglomeration(#[case] linkage: Linkage, #[case] seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let rows = (0..60)
        .map(|_| vec![rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)])
        .collect();
    let fixture = ChainFixture {
        layout: PointLayout::Uniform,
        linkage,
        rows,
    };
    assert_eq!(fixture.dimension(), 2);
    compare_with_exhaustive(&fixture).expect("plane hierarchy must match");
}

#[rstest]
#[case::no_merges_applied(4, false)]
#[case::between_tied_pair(3, true)]
#[case::after_tied_pair(2, false)]
#[case::all_merges_applied(1, false)]
fn tie_boundaries_are_detected(#[case] clusters: usize, #[case] expected: bool) {
    assert_eq!(straddles_tie(&[1.0, 1.0, 6.0], clusters), expected);
}

#[test]
fn evenly_spaced_line_matches_exhaustive_agglomeration() {
    let rows = [0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0, 30.0, 31.0]
        .into_iter()
        .map(|value| vec![value])
        .collect();
    let fixture = ChainFixture {
        layout: PointLayout::Filament,
        linkage: Linkage::Single,
        rows,
    };
    compare_with_exhaustive(&fixture).expect("tied hierarchy must match");
}

#[rstest]
#[case::centroid(Linkage::Centroid)]
#[case::median(Linkage::Median)]
fn inverted_root_merge_passes_structure_checks(#[case] linkage: Linkage) {
    let fixture = ChainFixture {
        layout: PointLayout::Uniform,
        linkage,
        rows: vec![vec![0.0, 0.0], vec![2.0, 0.0], vec![1.0, 1.8]],
    };
    let dendrogram = fit(&fixture, None).expect("fit succeeds");
    assert_eq!(dendrogram.merges().last().map(Merge::size), Some(2));
    check_structure(&fixture, &dendrogram).expect("inverted hierarchy is well formed");
    compare_schedules(&fixture).expect("fanned-out fit must match");
}
