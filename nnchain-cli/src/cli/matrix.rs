//! Loading delimited numeric matrices into a [`DenseSource`].
//!
//! One point per line. Values are separated by commas, whitespace, or both.
//! Blank lines and lines starting with `#` are skipped.

use std::fs;
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

use nnchain_core::{DataSourceError, DenseSource};
use thiserror::Error;
use tracing::{Span, field, instrument};

/// Errors raised while loading a matrix file.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: std::io::Error,
    },
    /// A value could not be parsed as a number.
    #[error("`{path}` line {line}: cannot parse `{value}` as a number: {source}")]
    Parse {
        /// File holding the offending value.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The rejected token.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: ParseFloatError,
    },
    /// The parsed rows did not form a valid matrix.
    #[error(transparent)]
    Invalid(#[from] DataSourceError),
}

/// Reads `path` and builds a dense source named `name`.
///
/// # Errors
/// Returns [`MatrixError::Io`] when the file cannot be read,
/// [`MatrixError::Parse`] for non-numeric tokens, and
/// [`MatrixError::Invalid`] when the rows are empty, ragged, or hold
/// non-finite values.
#[instrument(name = "cli.load_matrix", err, skip(name), fields(path = field::Empty, rows = field::Empty))]
pub fn load_matrix(path: &Path, name: &str) -> Result<DenseSource, MatrixError> {
    let span = Span::current();
    span.record("path", field::display(path.display()));
    let text = fs::read_to_string(path).map_err(|source| MatrixError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_rows(&text).map_err(|(line, value, source)| MatrixError::Parse {
        path: path.to_path_buf(),
        line,
        value,
        source,
    })?;
    span.record("rows", rows.len());
    Ok(DenseSource::try_new(name, rows)?)
}

type RowError = (usize, String, ParseFloatError);

fn parse_rows(text: &str) -> Result<Vec<Vec<f32>>, RowError> {
    let mut rows = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f32>()
                    .map_err(|source| (index + 1, token.to_owned(), source))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}
