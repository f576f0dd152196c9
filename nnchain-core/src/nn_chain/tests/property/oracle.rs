//! Exhaustive agglomeration used as the reference hierarchy.
//!
//! Repeatedly merges the globally closest pair over a full dissimilarity
//! matrix. Cubic, so only suitable for small fixtures. Uses the same naming
//! convention as the chain: the merged cluster keeps the lower id.

use crate::{
    DataSource,
    dendrogram::{Dendrogram, Merge},
    error::DataSourceError,
    linkage::LanceWilliams,
};

pub(super) fn exhaustive_dendrogram<D, L>(source: &D, rule: &L) -> Result<Dendrogram, DataSourceError>
where
    D: DataSource,
    L: LanceWilliams,
{
    let n = source.len();
    let mut matrix = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let distance = f64::from(source.distance(i, j)?);
            matrix[i][j] = distance;
            matrix[j][i] = distance;
        }
    }

    let mut active = vec![true; n];
    let mut sizes = vec![1_usize; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    for _ in 1..n {
        let Some((kept, removed, distance)) = closest_pair(&matrix, &active) else {
            break;
        };
        for other in (0..n).filter(|&other| active[other] && other != kept && other != removed) {
            let value = rule.update(
                sizes[kept],
                sizes[removed],
                sizes[other],
                matrix[kept][other],
                matrix[removed][other],
                distance,
            );
            matrix[kept][other] = value;
            matrix[other][kept] = value;
        }
        active[removed] = false;
        sizes[kept] += sizes[removed];
        merges.push(Merge::new(kept, removed, distance, sizes[kept]));
    }

    Ok(Dendrogram::from_discovery(n, merges))
}

fn closest_pair(matrix: &[Vec<f64>], active: &[bool]) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for i in (0..active.len()).filter(|&i| active[i]) {
        for j in ((i + 1)..active.len()).filter(|&j| active[j]) {
            let distance = matrix[i][j];
            if best.is_none_or(|(_, _, top)| distance < top) {
                best = Some((i, j, distance));
            }
        }
    }
    best
}
