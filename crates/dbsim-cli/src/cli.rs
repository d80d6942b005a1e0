use clap::{Args, Parser, Subcommand, ValueEnum};
use dbsim::engine::config::Neighborhood;
use dbsim::engine::simulator::SimulationEngine;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "dbsim - exact charge-distribution simulation and operational-domain analysis of silicon dangling bond (SiDB) logic.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate all physically valid charge distributions of a layout.
    Simulate(SimulateArgs),
    /// Check whether a gate layout implements its truth tables.
    Operational(OperationalArgs),
    /// Explore the operational domain of a gate over two physical parameters.
    Domain(DomainArgs),
    /// Find the farthest defect position that still changes the ground state.
    DefectInfluence(JobArgs),
    /// Report how close each charge distribution is to a charge transition.
    Stability(StabilityArgs),
}

/// Job file and the physical-parameter overrides shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override `simulation.base` (2 or 3).
    #[arg(long, value_name = "INT")]
    pub base: Option<u8>,

    /// Override `simulation.epsilon-r`.
    #[arg(long, value_name = "FLOAT")]
    pub epsilon_r: Option<f64>,

    /// Override `simulation.lambda-tf` (nm).
    #[arg(long, value_name = "FLOAT")]
    pub lambda_tf: Option<f64>,

    /// Override `simulation.mu-minus` (eV).
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub mu_minus: Option<f64>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Simulation engine to run.
    #[arg(short, long, value_enum, default_value_t = EngineArg::QuickExact)]
    pub engine: EngineArg,

    /// Keep the configured base instead of detecting whether positive charges can occur.
    #[arg(long)]
    pub no_base_detection: bool,

    /// Also report the probability of leaving the ground state at this temperature (K).
    #[arg(short, long, value_name = "KELVIN")]
    pub temperature: Option<f64>,

    /// Write every valid charge distribution to a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct OperationalArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Override the simulation engine from the job file.
    #[arg(short, long, value_enum)]
    pub engine: Option<EngineArg>,

    /// Also report, per input combination, the probability of an erroneous output at this temperature (K).
    #[arg(short, long, value_name = "KELVIN")]
    pub temperature: Option<f64>,
}

#[derive(Args, Debug)]
pub struct DomainArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Override the exploration strategy from the job file.
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Override the number of random samples (random sampling, contour tracing).
    #[arg(long, value_name = "INT")]
    pub samples: Option<usize>,

    /// Override the number of random seeds (flood fill).
    #[arg(long, value_name = "INT")]
    pub seeds: Option<usize>,

    /// Override the neighborhood flood fill expands into.
    #[arg(long, value_enum)]
    pub neighborhood: Option<NeighborhoodArg>,

    /// Write the classified grid points to a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StabilityArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Decimal places of the reported transition distances.
    #[arg(long, value_name = "INT")]
    pub precision: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineArg {
    QuickExact,
    Exhaustive,
}

impl From<EngineArg> for SimulationEngine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::QuickExact => SimulationEngine::QuickExact,
            EngineArg::Exhaustive => SimulationEngine::Exhaustive,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyArg {
    GridSearch,
    RandomSampling,
    FloodFill,
    ContourTracing,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborhoodArg {
    VonNeumann,
    Moore,
}

impl From<NeighborhoodArg> for Neighborhood {
    fn from(arg: NeighborhoodArg) -> Self {
        match arg {
            NeighborhoodArg::VonNeumann => Neighborhood::VonNeumann,
            NeighborhoodArg::Moore => Neighborhood::Moore,
        }
    }
}
