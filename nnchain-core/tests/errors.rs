use std::sync::Arc;

use nnchain_core::{
    DataSourceError, DataSourceErrorCode, DendrogramError, DendrogramErrorCode,
    ExecutionStrategy, NnChainError, NnChainErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(DataSourceError::OutOfBounds { index: 0 }, DataSourceErrorCode::OutOfBounds, "DATA_SOURCE_OUT_OF_BOUNDS")]
#[case(
    DataSourceError::DimensionMismatch { left: 1, right: 2 },
    DataSourceErrorCode::DimensionMismatch,
    "DATA_SOURCE_DIMENSION_MISMATCH",
)]
#[case(
    DataSourceError::NonFiniteValue { row: 3, column: 1 },
    DataSourceErrorCode::NonFiniteValue,
    "DATA_SOURCE_NON_FINITE_VALUE",
)]
#[case(DataSourceError::EmptyData, DataSourceErrorCode::EmptyData, "DATA_SOURCE_EMPTY")]
#[case(DataSourceError::ZeroDimension, DataSourceErrorCode::ZeroDimension, "DATA_SOURCE_ZERO_DIMENSION")]
fn returns_expected_data_source_code(
    #[case] error: DataSourceError,
    #[case] expected: DataSourceErrorCode,
    #[case] text: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), text);
    assert_eq!(expected.to_string(), text);
}

#[rstest]
#[case(
    DendrogramError::InvalidClusterCount { requested: 0, point_count: 4 },
    DendrogramErrorCode::InvalidClusterCount,
)]
#[case(
    DendrogramError::InvalidClusterRange { low: 5, high: 2, point_count: 4 },
    DendrogramErrorCode::InvalidClusterRange,
)]
fn returns_expected_dendrogram_code(
    #[case] error: DendrogramError,
    #[case] expected: DendrogramErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
}

#[rstest]
#[case(
    NnChainError::EmptySource { data_source: Arc::from("empty") },
    NnChainErrorCode::EmptySource,
    None,
)]
#[case(
    NnChainError::InsufficientItems { data_source: Arc::from("small"), items: 1 },
    NnChainErrorCode::InsufficientItems,
    None,
)]
#[case(
    NnChainError::InvalidClusterCount { got: 0 },
    NnChainErrorCode::InvalidClusterCount,
    None,
)]
#[case(
    NnChainError::InvalidClusterRange { low: 4, high: 2 },
    NnChainErrorCode::InvalidClusterRange,
    None,
)]
#[case(
    NnChainError::ClusterCountExceedsItems { requested: 9, items: 3 },
    NnChainErrorCode::ClusterCountExceedsItems,
    None,
)]
#[case(
    NnChainError::BackendUnavailable { requested: ExecutionStrategy::Parallel },
    NnChainErrorCode::BackendUnavailable,
    None,
)]
#[case(
    NnChainError::DataSource {
        data_source: Arc::from("source"),
        error: DataSourceError::OutOfBounds { index: 1 },
    },
    NnChainErrorCode::DataSourceFailure,
    Some(DataSourceErrorCode::OutOfBounds),
)]
#[case(
    NnChainError::Dendrogram(DendrogramError::InvalidClusterCount { requested: 0, point_count: 2 }),
    NnChainErrorCode::DendrogramFailure,
    None,
)]
fn returns_expected_nn_chain_code(
    #[case] error: NnChainError,
    #[case] expected: NnChainErrorCode,
    #[case] data_source_code: Option<DataSourceErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
    assert_eq!(error.data_source_code(), data_source_code);
}

#[test]
fn data_source_error_names_the_source() {
    let err = NnChainError::DataSource {
        data_source: Arc::from("dummy"),
        error: DataSourceError::DimensionMismatch { left: 2, right: 3 },
    };
    assert!(err.to_string().contains("dummy"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn dendrogram_errors_convert_transparently() {
    let inner = DendrogramError::InvalidClusterCount {
        requested: 7,
        point_count: 4,
    };
    let err = NnChainError::from(inner.clone());
    assert_eq!(err.to_string(), inner.to_string());
}
