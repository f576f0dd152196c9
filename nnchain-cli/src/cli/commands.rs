//! Command implementations and argument parsing for the nnchain CLI.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use nnchain_core::{
    ClusteringResult, DataSource, DistanceCacheConfig, ExecutionStrategy, Linkage,
    NnChainBuilder, NnChainError,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::matrix::{MatrixError, load_matrix};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "nnchain",
    about = "Hierarchical clustering with the nearest-neighbour chain."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Returns the output format requested by the command.
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        match &self.command {
            Command::Run(run) => run.format,
        }
    }
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster the points in a delimited numeric file.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// File with one point per line; values separated by commas or
    /// whitespace, `#` starts a comment line.
    pub path: PathBuf,

    /// Lance-Williams linkage rule.
    #[arg(long, default_value_t = Linkage::Ward)]
    pub linkage: Linkage,

    /// Exact number of clusters to form.
    #[arg(long, conflicts_with_all = ["min_clusters", "max_clusters"])]
    pub clusters: Option<usize>,

    /// Smallest cluster count the heuristic may choose.
    #[arg(long, requires = "max_clusters")]
    pub min_clusters: Option<usize>,

    /// Largest cluster count the heuristic may choose.
    #[arg(long, requires = "min_clusters")]
    pub max_clusters: Option<usize>,

    /// Execution strategy for the chain engine.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Cache up to this many point-to-point distances.
    #[arg(long = "distance-cache", value_name = "ENTRIES")]
    pub distance_cache: Option<NonZeroUsize>,

    /// Override name for the data source (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,

    /// Layout of the summary written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execution strategies accepted on the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel when compiled in, sequential otherwise.
    Auto,
    /// Single-threaded scans and updates.
    Sequential,
    /// Rayon fan-out; fails when the `parallel` feature is disabled.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Summary layouts supported by [`render_summary`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Header lines followed by `index<TAB>label` rows.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input matrix could not be loaded.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// Clustering failed.
    #[error(transparent)]
    Core(#[from] NnChainError),
}

impl CliError {
    /// Returns the stable error code and, when a data source failed, its
    /// code as well.
    #[must_use]
    pub fn codes(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            Self::Core(core) => (
                Some(core.code().as_str()),
                core.data_source_code().map(|code| code.as_str()),
            ),
            Self::Matrix(MatrixError::Invalid(invalid)) => (None, Some(invalid.code().as_str())),
            Self::Matrix(_) => (None, None),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name reported by the data source implementation.
    pub data_source: String,
    /// Linkage used to build the hierarchy.
    pub linkage: Linkage,
    /// Flat cluster labels.
    pub result: ClusteringResult,
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    data_source: &'a str,
    linkage: &'static str,
    clusters: usize,
    cluster_sizes: Vec<usize>,
    labels: Vec<usize>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or clustering fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use nnchain_cli::cli::{Cli, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0,0\n0,1\n9,9\n9,8\n")?;
/// let path = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from(["nnchain", "run", path.as_str(), "--clusters", "2"])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.labels().collect::<Vec<_>>(), vec![0, 0, 1, 1]);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        linkage = %command.linkage,
        clusters = field::Empty,
        strategy = ?command.strategy,
        override_name = field::Empty,
    ),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    span.record(
        "override_name",
        field::display(command.name.as_deref().unwrap_or("<derived>")),
    );

    let builder = NnChainBuilder::new()
        .with_linkage(command.linkage)
        .with_execution_strategy(command.strategy.into())
        .with_distance_cache(command.distance_cache.map(DistanceCacheConfig::new));
    let builder = match (command.clusters, command.min_clusters, command.max_clusters) {
        (Some(clusters), _, _) => {
            span.record("clusters", field::display(clusters));
            builder.with_cluster_count(clusters)
        }
        (None, Some(low), Some(high)) => {
            span.record("clusters", field::display(format_args!("{low}..={high}")));
            builder.with_cluster_range(low, high)
        }
        _ => {
            span.record("clusters", field::display("auto"));
            builder.with_automatic_cluster_count()
        }
    };
    let nn_chain = builder.build()?;

    let chosen_name = derive_data_source_name(&command.path, command.name.as_deref());
    let source = load_matrix(&command.path, &chosen_name)?;
    let result = nn_chain.run(&source)?;

    info!(
        data_source = source.name(),
        clusters = result.cluster_count(),
        "command completed"
    );
    Ok(ExecutionSummary {
        data_source: source.name().to_owned(),
        linkage: nn_chain.linkage(),
        result,
    })
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "data_source".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer` in the requested `format`.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use nnchain_cli::cli::{ExecutionSummary, OutputFormat, render_summary};
/// # use nnchain_core::{ClusterId, ClusteringResult, Linkage};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     data_source: "demo".into(),
///     linkage: Linkage::Ward,
///     result: ClusteringResult::try_from_assignments(vec![
///         ClusterId::new(0),
///         ClusterId::new(1),
///     ])?,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, OutputFormat::Text, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "data source: demo\nlinkage: ward\nclusters: 2\n0\t0\n1\t1\n"
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(
    summary: &ExecutionSummary,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(writer, "data source: {}", summary.data_source)?;
            writeln!(writer, "linkage: {}", summary.linkage)?;
            writeln!(writer, "clusters: {}", summary.result.cluster_count())?;
            for (index, label) in summary.result.labels().enumerate() {
                writeln!(writer, "{index}\t{label}")?;
            }
        }
        OutputFormat::Json => {
            let document = SummaryDocument {
                data_source: &summary.data_source,
                linkage: summary.linkage.as_str(),
                clusters: summary.result.cluster_count(),
                cluster_sizes: summary.result.cluster_sizes(),
                labels: summary.result.labels().collect(),
            };
            serde_json::to_writer(&mut writer, &document)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
