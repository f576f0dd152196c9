//! Lance-Williams dissimilarity update rules.
//!
//! When clusters `i` and `j` merge, the dissimilarity between the merged
//! cluster and any third cluster `k` is a linear combination of the
//! pre-merge dissimilarities:
//!
//! ```text
//! d(i∪j, k) = α(nᵢ,nⱼ,nₖ)·d(i,k) + α(nⱼ,nᵢ,nₖ)·d(j,k) + β(nᵢ,nⱼ,nₖ)·d(i,j) + γ(nᵢ,nⱼ,nₖ)·|d(i,k) − d(j,k)|
//! ```
//!
//! Rules differ only in their three coefficient functions.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// A dissimilarity update rule from the Lance-Williams family.
///
/// Implementations must be pure: the engine evaluates [`update`] from
/// several worker threads at once when parallel execution is enabled.
///
/// The nearest-neighbour chain only reproduces the exact agglomerative
/// hierarchy for *reducible* rules, where merging two clusters never brings
/// the result closer to a third cluster than either part was. Report that
/// through [`is_reducible`]; the engine logs a warning before running a rule
/// that is not.
///
/// [`update`]: LanceWilliams::update
/// [`is_reducible`]: LanceWilliams::is_reducible
///
/// # Examples
/// ```
/// use nnchain_core::LanceWilliams;
///
/// /// Plain average of the two old dissimilarities.
/// struct Midpoint;
///
/// impl LanceWilliams for Midpoint {
///     fn alpha(&self, _: usize, _: usize, _: usize) -> f64 { 0.5 }
///     fn beta(&self, _: usize, _: usize, _: usize) -> f64 { 0.0 }
///     fn gamma(&self, _: usize, _: usize, _: usize) -> f64 { 0.0 }
/// }
///
/// assert_eq!(Midpoint.update(1, 1, 1, 2.0, 4.0, 1.0), 3.0);
/// ```
pub trait LanceWilliams: Sync {
    /// Weight applied to `d(i, k)`; the engine calls it again with `i` and
    /// `j` swapped to weight `d(j, k)`.
    fn alpha(&self, ni: usize, nj: usize, nk: usize) -> f64;

    /// Weight applied to `d(i, j)`.
    fn beta(&self, ni: usize, nj: usize, nk: usize) -> f64;

    /// Weight applied to `|d(i, k) − d(j, k)|`.
    fn gamma(&self, ni: usize, nj: usize, nk: usize) -> f64;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Whether the rule is reducible, making the chain-based search exact.
    fn is_reducible(&self) -> bool {
        false
    }

    /// Evaluates the recurrence for the cluster formed by merging `i` and `j`
    /// against a third cluster `k`.
    fn update(&self, ni: usize, nj: usize, nk: usize, d_ik: f64, d_jk: f64, d_ij: f64) -> f64 {
        self.alpha(ni, nj, nk) * d_ik
            + self.alpha(nj, ni, nk) * d_jk
            + self.beta(ni, nj, nk) * d_ij
            + self.gamma(ni, nj, nk) * (d_ik - d_jk).abs()
    }
}

/// The standard linkage criteria.
///
/// # Examples
/// ```
/// use nnchain_core::{LanceWilliams, Linkage};
///
/// let linkage: Linkage = "average".parse()?;
/// assert_eq!(linkage, Linkage::Average);
/// assert!(linkage.is_reducible());
/// assert!(!Linkage::Centroid.is_reducible());
/// assert_eq!(Linkage::default(), Linkage::Ward);
/// # Ok::<(), nnchain_core::ParseLinkageError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Linkage {
    /// Nearest member distance.
    Single,
    /// Furthest member distance.
    Complete,
    /// Size-weighted mean of member distances (UPGMA).
    Average,
    /// Unweighted mean of the merged halves (WPGMA, McQuitty).
    Weighted,
    /// Distance between centroids (UPGMC). Not reducible.
    Centroid,
    /// Distance between unweighted centroids (WPGMC). Not reducible.
    Median,
    /// Ward's minimum-variance criterion.
    #[default]
    Ward,
}

impl Linkage {
    /// Every supported linkage, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Single,
        Self::Complete,
        Self::Average,
        Self::Weighted,
        Self::Centroid,
        Self::Median,
        Self::Ward,
    ];

    /// Returns the lower-case name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
            Self::Weighted => "weighted",
            Self::Centroid => "centroid",
            Self::Median => "median",
            Self::Ward => "ward",
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}

impl LanceWilliams for Linkage {
    fn alpha(&self, ni: usize, nj: usize, nk: usize) -> f64 {
        match self {
            Self::Single | Self::Complete | Self::Weighted | Self::Median => 0.5,
            Self::Average | Self::Centroid => ratio(ni, ni + nj),
            Self::Ward => ratio(ni + nk, ni + nj + nk),
        }
    }

    fn beta(&self, ni: usize, nj: usize, nk: usize) -> f64 {
        match self {
            Self::Single | Self::Complete | Self::Average | Self::Weighted => 0.0,
            Self::Centroid => {
                let total = ratio(1, ni + nj);
                -(ratio(ni, 1) * ratio(nj, 1)) * total * total
            }
            Self::Median => -0.25,
            Self::Ward => -ratio(nk, ni + nj + nk),
        }
    }

    fn gamma(&self, _ni: usize, _nj: usize, _nk: usize) -> f64 {
        match self {
            Self::Single => -0.5,
            Self::Complete => 0.5,
            _ => 0.0,
        }
    }

    fn name(&self) -> &str {
        self.as_str()
    }

    fn is_reducible(&self) -> bool {
        !matches!(self, Self::Centroid | Self::Median)
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown linkage name.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown linkage `{input}`; expected one of single, complete, average, weighted, centroid, median, ward")]
pub struct ParseLinkageError {
    input: String,
}

impl ParseLinkageError {
    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for Linkage {
    type Err = ParseLinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "upgma" => Ok(Self::Average),
            "wpgma" | "mcquitty" => Ok(Self::Weighted),
            "upgmc" => Ok(Self::Centroid),
            "wpgmc" => Ok(Self::Median),
            other => Self::ALL
                .into_iter()
                .find(|linkage| linkage.as_str() == other)
                .ok_or_else(|| ParseLinkageError {
                    input: s.to_owned(),
                }),
        }
    }
}
