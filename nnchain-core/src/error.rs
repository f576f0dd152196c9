//! Error types for the nnchain core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::builder::ExecutionStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by [`crate::DataSource`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DataSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested row that exceeded the source bounds.
        index: usize,
    },
    /// Rows had different dimensions.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the first row.
        left: usize,
        /// Dimensionality of the offending row.
        right: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("row {row} contains a non-finite value at column {column}")]
    NonFiniteValue {
        /// Row holding the offending value.
        row: usize,
        /// Column of the offending value within the row.
        column: usize,
    },
    /// Data source contained no rows.
    #[error("data source contains no rows")]
    EmptyData,
    /// Data source rows must have positive dimension.
    #[error("data source vectors must have positive dimension")]
    ZeroDimension,
}

define_error_codes! {
    /// Stable codes describing [`DataSourceError`] variants.
    enum DataSourceErrorCode for DataSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "DATA_SOURCE_OUT_OF_BOUNDS",
        /// Rows had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "DATA_SOURCE_DIMENSION_MISMATCH",
        /// A coordinate was NaN or infinite.
        NonFiniteValue => NonFiniteValue { .. } => "DATA_SOURCE_NON_FINITE_VALUE",
        /// Data source contained no rows.
        EmptyData => EmptyData => "DATA_SOURCE_EMPTY",
        /// Data source rows must have positive dimension.
        ZeroDimension => ZeroDimension => "DATA_SOURCE_ZERO_DIMENSION",
    }
}

/// Error raised when querying a [`crate::Dendrogram`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DendrogramError {
    /// The requested cluster count falls outside `1..=point_count`.
    #[error("cluster count {requested} is outside the valid range 1..={point_count}")]
    InvalidClusterCount {
        /// Cluster count supplied by the caller.
        requested: usize,
        /// Number of points covered by the dendrogram.
        point_count: usize,
    },
    /// The lower bound of a cluster-count range exceeds the upper bound, is
    /// zero, or exceeds the number of points.
    #[error("cluster count range {low}..={high} is invalid for {point_count} points")]
    InvalidClusterRange {
        /// Lower bound supplied by the caller.
        low: usize,
        /// Upper bound supplied by the caller.
        high: usize,
        /// Number of points covered by the dendrogram.
        point_count: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`DendrogramError`] variants.
    enum DendrogramErrorCode for DendrogramError {
        /// The requested cluster count falls outside `1..=point_count`.
        InvalidClusterCount => InvalidClusterCount { .. } => "DENDROGRAM_INVALID_CLUSTER_COUNT",
        /// The supplied cluster-count range is empty or out of bounds.
        InvalidClusterRange => InvalidClusterRange { .. } => "DENDROGRAM_INVALID_CLUSTER_RANGE",
    }
}

/// Error type produced when constructing or running [`crate::NnChain`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum NnChainError {
    /// The supplied [`crate::DataSource`] contained no items.
    #[error("data source `{data_source}` contains no items")]
    EmptySource {
        /// Identifier for the empty data source.
        data_source: Arc<str>,
    },
    /// Hierarchical clustering needs at least two items.
    #[error("data source `{data_source}` has {items} item(s) but clustering requires at least 2")]
    InsufficientItems {
        /// Identifier for the data source that lacked sufficient items.
        data_source: Arc<str>,
        /// Number of items available in the data source.
        items: usize,
    },
    /// An exact cluster count of zero was requested.
    #[error("cluster count must be at least 1 (got {got})")]
    InvalidClusterCount {
        /// Cluster count supplied to the builder.
        got: usize,
    },
    /// A cluster-count range was empty or started at zero.
    #[error("cluster count range {low}..={high} is invalid")]
    InvalidClusterRange {
        /// Lower bound of the range.
        low: usize,
        /// Upper bound of the range.
        high: usize,
    },
    /// The requested cluster count, or the lower bound of the requested
    /// range, exceeds the number of items.
    #[error("cannot form {requested} clusters from {items} items")]
    ClusterCountExceedsItems {
        /// Smallest cluster count the configuration allows.
        requested: usize,
        /// Number of items available in the data source.
        items: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// A [`crate::DataSource`] operation failed while running the algorithm.
    #[error("data source `{data_source}` failed: {error}")]
    DataSource {
        /// Identifier for the data source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying data source error bubbled up by the algorithm.
        error: DataSourceError,
    },
    /// A dendrogram query failed.
    #[error(transparent)]
    Dendrogram(#[from] DendrogramError),
}

define_error_codes! {
    /// Stable codes describing [`NnChainError`] variants.
    enum NnChainErrorCode for NnChainError {
        /// The supplied [`crate::DataSource`] contained no items.
        EmptySource => EmptySource { .. } => "NNCHAIN_EMPTY_SOURCE",
        /// Hierarchical clustering needs at least two items.
        InsufficientItems => InsufficientItems { .. } => "NNCHAIN_INSUFFICIENT_ITEMS",
        /// An exact cluster count of zero was requested.
        InvalidClusterCount => InvalidClusterCount { .. } => "NNCHAIN_INVALID_CLUSTER_COUNT",
        /// A cluster-count range was invalid.
        InvalidClusterRange => InvalidClusterRange { .. } => "NNCHAIN_INVALID_CLUSTER_RANGE",
        /// The requested cluster count exceeds the number of items.
        ClusterCountExceedsItems => ClusterCountExceedsItems { .. } => "NNCHAIN_CLUSTER_COUNT_EXCEEDS_ITEMS",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "NNCHAIN_BACKEND_UNAVAILABLE",
        /// A [`crate::DataSource`] operation failed while running the algorithm.
        DataSourceFailure => DataSource { .. } => "NNCHAIN_DATA_SOURCE_FAILURE",
        /// A dendrogram query failed.
        DendrogramFailure => Dendrogram(..) => "NNCHAIN_DENDROGRAM_FAILURE",
    }
}

impl NnChainError {
    /// Retrieve the inner [`DataSourceErrorCode`] when the error originated in a [`crate::DataSource`].
    #[must_use]
    pub const fn data_source_code(&self) -> Option<DataSourceErrorCode> {
        match self {
            Self::DataSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, NnChainError>;
