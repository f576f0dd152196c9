//! Command-line interface orchestration for nearest-neighbour chain
//! clustering.
//!
//! The CLI offers a single `run` command that loads a delimited numeric
//! matrix, clusters it, and reports the flat labels as text or JSON.

mod commands;
mod matrix;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, OutputFormat, RunCommand, StrategyArg,
    render_summary, run_cli,
};
pub use matrix::{MatrixError, load_matrix};
