//! Dense in-memory data source backed by a contiguous row-major matrix.

use crate::{datasource::DataSource, error::DataSourceError};

/// In-memory `f32` point set with Euclidean distance.
///
/// Rows are stored contiguously so that distance evaluation touches a single
/// allocation.
///
/// # Examples
/// ```
/// use nnchain_core::{DataSource, DenseSource};
///
/// let source = DenseSource::try_new("demo", vec![vec![0.0, 0.0], vec![3.0, 4.0]])?;
/// assert_eq!(source.len(), 2);
/// assert_eq!(source.dimension(), 2);
/// assert_eq!(source.distance(0, 1)?, 5.0);
/// # Ok::<(), nnchain_core::DataSourceError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DenseSource {
    name: String,
    dimension: usize,
    values: Vec<f32>,
}

impl DenseSource {
    /// Creates a dense source after validating the rows.
    ///
    /// # Errors
    /// Returns [`DataSourceError::EmptyData`] when `rows` is empty,
    /// [`DataSourceError::ZeroDimension`] when the rows have no columns,
    /// [`DataSourceError::DimensionMismatch`] when row lengths differ, and
    /// [`DataSourceError::NonFiniteValue`] when any coordinate is NaN or
    /// infinite.
    ///
    /// # Examples
    /// ```
    /// use nnchain_core::{DataSourceError, DenseSource};
    ///
    /// let ragged = DenseSource::try_new("demo", vec![vec![0.0], vec![1.0, 2.0]]);
    /// assert!(matches!(ragged, Err(DataSourceError::DimensionMismatch { left: 1, right: 2 })));
    /// let empty = DenseSource::try_new("demo", vec![]);
    /// assert!(matches!(empty, Err(DataSourceError::EmptyData)));
    /// ```
    pub fn try_new(name: impl Into<String>, rows: Vec<Vec<f32>>) -> Result<Self, DataSourceError> {
        let Some(first) = rows.first() else {
            return Err(DataSourceError::EmptyData);
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(DataSourceError::ZeroDimension);
        }

        let mut values = Vec::with_capacity(rows.len().saturating_mul(dimension));
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(DataSourceError::DimensionMismatch {
                    left: dimension,
                    right: row.len(),
                });
            }
            if let Some(column) = row.iter().position(|value| !value.is_finite()) {
                return Err(DataSourceError::NonFiniteValue {
                    row: row_index,
                    column,
                });
            }
            values.extend_from_slice(row);
        }

        Ok(Self {
            name: name.into(),
            dimension,
            values,
        })
    }

    /// Returns the number of columns per row.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the coordinates of row `index`, if present.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.values.get(start..end)
    }
}

impl DataSource for DenseSource {
    fn len(&self) -> usize {
        self.values.len() / self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
        let a = self
            .row(i)
            .ok_or(DataSourceError::OutOfBounds { index: i })?;
        let b = self
            .row(j)
            .ok_or(DataSourceError::OutOfBounds { index: j })?;
        let sum = a
            .iter()
            .zip(b)
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum::<f32>();
        Ok(sum.sqrt())
    }
}
