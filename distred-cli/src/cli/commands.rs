//! Command implementations and argument parsing for the distred CLI.

use std::{
    io::{self, Write},
    num::NonZeroUsize,
    thread,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use distred_core::{
    Benchmark, BenchmarkBuilder, BenchmarkReport, DEFAULT_RUNS, DEFAULT_SWEEP, DataLayout,
    DistanceReducer, ExecutionStrategy, ReduceError, Reducer, ReducerBuilder, SeedPolicy,
    ThreadModel, ValueRange, VectorPair,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "distred",
    about = "Benchmark Euclidean distance reductions across execution strategies."
)]
pub struct Cli {
    /// Strategy to benchmark.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported strategies.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fold the whole vector on one thread.
    Sequential(SequentialArgs),
    /// Fold partitions on worker threads sharing the vectors.
    Shared(SharedArgs),
    /// Fold partitions on message-passing ranks.
    Distributed(DistributedArgs),
}

/// Options shared by every strategy.
///
/// Counts are parsed as [`NonZeroUsize`], so a zero length, run count or
/// worker count is a usage error reported by clap.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct CommonArgs {
    /// Number of elements in each vector.
    #[arg(long)]
    pub length: NonZeroUsize,

    /// Number of timed runs per worker count.
    #[arg(long, default_value_t = default_runs())]
    pub runs: NonZeroUsize,

    /// Fixed seed for reproducible vectors; fresh entropy when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Range generated values are drawn from.
    #[arg(long, value_enum, default_value_t = ValuesArg::Unit)]
    pub values: ValuesArg,

    /// Regenerate the vectors before every run.
    #[arg(long)]
    pub regenerate: bool,

    /// Skip the comparison against the sequential oracle.
    #[arg(long = "no-verify")]
    pub no_verify: bool,

    /// Print the first K elements of each vector before timing.
    #[arg(long, value_name = "K")]
    pub preview: Option<usize>,
}

/// Arguments for `distred sequential`.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct SequentialArgs {
    /// Options shared by every strategy.
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for `distred shared`.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct SharedArgs {
    /// Options shared by every strategy.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Comma-separated worker counts to sweep.
    #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = default_sweep())]
    pub threads: Vec<NonZeroUsize>,

    /// How worker threads are scheduled.
    #[arg(long, value_enum, default_value_t = ModelArg::ForkJoin)]
    pub model: ModelArg,
}

/// Arguments for `distred distributed`.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct DistributedArgs {
    /// Options shared by every strategy.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of ranks in the process group, including the root.
    #[arg(long, env = "DISTRED_RANKS")]
    pub ranks: NonZeroUsize,

    /// How vectors are distributed to the ranks.
    #[arg(long, value_enum, default_value_t = LayoutArg::Replicated)]
    pub layout: LayoutArg,
}

fn default_runs() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_RUNS).unwrap_or(NonZeroUsize::MIN)
}

fn default_sweep() -> Vec<NonZeroUsize> {
    DEFAULT_SWEEP
        .into_iter()
        .filter_map(NonZeroUsize::new)
        .collect()
}

/// Value ranges accepted by `--values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValuesArg {
    /// Uniform values in `[0, 1)`.
    Unit,
    /// Whole numbers in `0..=99`.
    Percent,
}

impl From<ValuesArg> for ValueRange {
    fn from(value: ValuesArg) -> Self {
        match value {
            ValuesArg::Unit => Self::UnitInterval,
            ValuesArg::Percent => Self::Percent,
        }
    }
}

/// Thread models accepted by `--model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelArg {
    /// Dedicated fork-join pool.
    ForkJoin,
    /// One scoped thread per partition.
    Scoped,
}

impl From<ModelArg> for ThreadModel {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::ForkJoin => Self::ForkJoin,
            ModelArg::Scoped => Self::Scoped,
        }
    }
}

/// Data layouts accepted by `--layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Every rank receives both full vectors.
    Replicated,
    /// Every rank receives only its own slices.
    Scattered,
}

impl From<LayoutArg> for DataLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Replicated => Self::Replicated,
            LayoutArg::Scattered => Self::Scattered,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration, generation or reduction failed.
    #[error(transparent)]
    Core(#[from] ReduceError),
    /// A reducer disagreed with the sequential oracle.
    #[error(
        "{strategy} with {workers} workers drifted from the sequential result \
         (max relative error {max_relative_error:e})"
    )]
    VerificationFailed {
        /// Strategy that produced the drifting result.
        strategy: &'static str,
        /// Worker count of the drifting reducer.
        workers: usize,
        /// Largest relative error observed.
        max_relative_error: f64,
    },
}

/// Leading values of the generated vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    /// First values of the left vector.
    pub left: Vec<f64>,
    /// First values of the right vector.
    pub right: Vec<f64>,
}

/// Outcome of executing a CLI command.
///
/// Reports that drifted from the sequential oracle are kept so they can be
/// rendered; [`Execution::verify`] turns them into an error afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Leading values of the vectors, when requested.
    pub preview: Option<Preview>,
    /// Processors available to this process.
    pub processors: NonZeroUsize,
    /// One report per benchmarked worker count.
    pub reports: Vec<BenchmarkReport>,
}

impl Execution {
    /// Checks every report against the sequential oracle.
    ///
    /// # Errors
    /// Returns [`CliError::VerificationFailed`] for the first report whose
    /// worst relative error reached the tolerance.
    pub fn verify(&self) -> Result<(), CliError> {
        self.reports.iter().try_for_each(check_verification)
    }
}

/// Executes the command represented by `cli`.
///
/// Every option is validated, and every reducer started, before the vectors
/// are generated.
///
/// Drift from the sequential oracle does not fail this call; see
/// [`Execution::verify`].
///
/// # Errors
/// Returns [`CliError`] when configuration, generation or a reduction fails.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use distred_cli::cli::{Cli, Command, CommonArgs, SequentialArgs, ValuesArg, run_cli};
///
/// let cli = Cli {
///     command: Command::Sequential(SequentialArgs {
///         common: CommonArgs {
///             length: NonZeroUsize::new(1_000).expect("non-zero"),
///             runs: NonZeroUsize::new(2).expect("non-zero"),
///             seed: Some(42),
///             values: ValuesArg::Unit,
///             regenerate: false,
///             no_verify: false,
///             preview: None,
///         },
///     }),
/// };
/// let execution = run_cli(cli)?;
/// assert_eq!(execution.reports.len(), 1);
/// execution.verify()?;
/// # Ok::<(), distred_cli::cli::CliError>(())
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<Execution, CliError> {
    let span = Span::current();
    let (label, common, builder, workers) = match cli.command {
        Command::Sequential(args) => (
            "sequential",
            args.common,
            ReducerBuilder::new(),
            vec![NonZeroUsize::MIN],
        ),
        Command::Shared(args) => (
            "shared",
            args.common,
            ReducerBuilder::new()
                .with_strategy(ExecutionStrategy::SharedMemory)
                .with_thread_model(args.model.into()),
            args.threads,
        ),
        Command::Distributed(args) => (
            "distributed",
            args.common,
            ReducerBuilder::new()
                .with_strategy(ExecutionStrategy::Distributed)
                .with_layout(args.layout.into()),
            vec![args.ranks],
        ),
    };
    span.record("command", field::display(label));
    execute(&common, &builder, &workers)
}

#[instrument(
    name = "cli.execute",
    skip_all,
    fields(length = common.length.get(), runs = common.runs.get(), workers = ?workers),
)]
pub(super) fn execute(
    common: &CommonArgs,
    builder: &ReducerBuilder,
    workers: &[NonZeroUsize],
) -> Result<Execution, CliError> {
    let benchmark = benchmark_from(common)?;
    let reducers = start_reducers(builder, workers)?;

    let pair = benchmark.generate()?;
    let preview = common.preview.map(|count| {
        let (left, right) = pair.preview(count);
        Preview {
            left: left.to_vec(),
            right: right.to_vec(),
        }
    });

    let reports = measure(&benchmark, &pair, reducers.as_slice())?;
    Ok(Execution {
        preview,
        processors: available_processors(),
        reports,
    })
}

/// Benchmarks every reducer on `pair`, keeping drifting reports.
pub(super) fn measure<R: DistanceReducer>(
    benchmark: &Benchmark,
    pair: &VectorPair,
    reducers: &[R],
) -> Result<Vec<BenchmarkReport>, CliError> {
    let mut reports = Vec::with_capacity(reducers.len());
    for reducer in reducers {
        let report = benchmark.run_on(reducer, pair.clone())?;
        info!(
            strategy = report.strategy(),
            workers = report.workers().get(),
            average_secs = report.average().as_secs_f64(),
            within_tolerance = check_verification(&report).is_ok(),
            "benchmark completed"
        );
        reports.push(report);
    }
    Ok(reports)
}

pub(super) fn available_processors() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

pub(super) fn benchmark_from(common: &CommonArgs) -> Result<Benchmark, CliError> {
    let seed = common.seed.map_or(SeedPolicy::Entropy, SeedPolicy::Fixed);
    let benchmark = BenchmarkBuilder::new(common.length.get())
        .with_runs(common.runs.get())
        .with_seed(seed)
        .with_values(common.values.into())
        .regenerate_each_run(common.regenerate)
        .verify(!common.no_verify)
        .build()?;
    Ok(benchmark)
}

fn start_reducers(
    builder: &ReducerBuilder,
    workers: &[NonZeroUsize],
) -> Result<Vec<Reducer>, CliError> {
    if workers.is_empty() {
        return Err(ReduceError::EmptySweep.into());
    }
    workers
        .iter()
        .map(|&count| {
            builder
                .clone()
                .with_workers(count.get())
                .build()
                .map_err(CliError::from)
        })
        .collect()
}

fn check_verification(report: &BenchmarkReport) -> Result<(), CliError> {
    match report.verification() {
        Some(verification) if !verification.is_within_tolerance() => {
            Err(CliError::VerificationFailed {
                strategy: report.strategy(),
                workers: report.workers().get(),
                max_relative_error: verification.max_relative_error(),
            })
        }
        _ => Ok(()),
    }
}

/// Renders `execution` to `writer` in the line format of the benchmark
/// programs.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::{error::Error, num::NonZeroUsize};
/// # use distred_cli::cli::{Cli, Command, CommonArgs, SequentialArgs, ValuesArg};
/// # use distred_cli::cli::{render_execution, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let cli = Cli {
///     command: Command::Sequential(SequentialArgs {
///         common: CommonArgs {
///             length: NonZeroUsize::new(16).ok_or("zero length")?,
///             runs: NonZeroUsize::new(3).ok_or("zero runs")?,
///             seed: Some(1),
///             values: ValuesArg::Percent,
///             regenerate: false,
///             no_verify: true,
///             preview: None,
///         },
///     }),
/// };
/// let mut buffer = Vec::new();
/// render_execution(&run_cli(cli)?, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// let last = text.lines().last().unwrap_or_default();
/// assert!(last.starts_with("Average time over 3 runs:"));
/// # Ok(())
/// # }
/// ```
pub fn render_execution(execution: &Execution, mut writer: impl Write) -> io::Result<()> {
    if let Some(preview) = &execution.preview {
        let shown = preview.left.len();
        writeln!(writer, "Left vector (first {shown}): {:?}", preview.left)?;
        writeln!(writer, "Right vector (first {shown}): {:?}", preview.right)?;
    }
    for report in &execution.reports {
        writeln!(
            writer,
            "Strategy: {}, workers: {}, vector length: {}, available processors: {}",
            report.strategy(),
            report.workers(),
            report.len(),
            execution.processors
        )?;
        if let Some(verification) = report.verification() {
            writeln!(
                writer,
                "Sequential distance = {:.6}, max relative error = {:e}",
                verification.oracle(),
                verification.max_relative_error()
            )?;
        }
        for record in report.runs() {
            writeln!(
                writer,
                "Run {}: distance = {:.6}, time = {:.6} s",
                record.run,
                record.distance,
                record.elapsed.as_secs_f64()
            )?;
        }
        writeln!(
            writer,
            "Average time over {} runs: {:.6} s",
            report.runs().len(),
            report.average().as_secs_f64()
        )?;
    }
    Ok(())
}
