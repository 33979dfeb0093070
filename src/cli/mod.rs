//! `revenue-forecast` command line.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use forecast_config::EngineKind;

use crate::{errors::CliError, utils::build_info};

#[derive(Parser, Debug)]
#[command(
    name = "revenue-forecast",
    version = build_info::VERSION_LINE,
    about = "Forecast daily and monthly revenue from a sales workbook"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load sales, fit the model and write the report and charts
    Run(RunArgs),
    /// Show sheets, headers and the first rows of a workbook
    Inspect(InspectArgs),
    /// Write a default configuration file
    InitConfig(InitConfigArgs),
    /// Show build metadata
    Version,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Configuration file (JSON)
    #[arg(short, long, env = "REVENUE_FORECAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sales workbook (xlsx, xls or ods)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Sheet holding the sales rows
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Directory for the report and charts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Year to project (defaults to next year)
    #[arg(short = 'y', long)]
    pub target_year: Option<i32>,

    /// Days to forecast when the history already reaches the target year
    #[arg(long)]
    pub horizon_fallback: Option<u32>,

    /// Forecast engine
    #[arg(short, long, value_enum)]
    pub engine: Option<EngineArg>,

    /// Only write the workbook
    #[arg(long)]
    pub skip_charts: bool,
}

#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// Configuration file (JSON)
    #[arg(short, long, env = "REVENUE_FORECAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workbook to inspect
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Sheet to preview (defaults to the configured sheet)
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Number of data rows to show
    #[arg(short, long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Args, Debug, Default)]
pub struct InitConfigArgs {
    /// Destination (defaults to the per-user configuration path)
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    Decomposition,
    Baseline,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Decomposition => EngineKind::Decomposition,
            EngineArg::Baseline => EngineKind::Baseline,
        }
    }
}

/// Parses the process arguments and dispatches the chosen command.
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => commands::run(args),
        Command::Inspect(args) => commands::inspect(args),
        Command::InitConfig(args) => commands::init_config(args),
        Command::Version => {
            commands::version();
            Ok(())
        }
    }
}
