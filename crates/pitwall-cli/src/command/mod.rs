use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pitwall_analysis::config::AnalysisConfig;
use tracing_subscriber::EnvFilter;

use self::{
    deviation::DeviationArg, front_back::FrontBackArg, lap_consistency::LapConsistencyArg,
    merge::MergeArg, pit_order::PitOrderArg, process::ProcessArg, stop_count::StopCountArg,
};
use crate::util;

mod deviation;
mod display;
mod front_back;
mod lap_consistency;
mod merge;
mod pit_order;
mod process;
mod stop_count;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Analysis configuration JSON file; command-line flags take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// What analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Merge CSV tables through their shared identifier columns
    Merge(#[clap(flatten)] MergeArg),
    /// Merge the pit-stop tables and derive per-stop features
    Process(#[clap(flatten)] ProcessArg),
    /// Distribution of pit-stop timing per total-stop count
    PitOrder(#[clap(flatten)] PitOrderArg),
    /// Compare pit-stop timing of front and back finishers
    FrontBack(#[clap(flatten)] FrontBackArg),
    /// Compare deviation from evenly spaced stops of front and back finishers
    Deviation(#[clap(flatten)] DeviationArg),
    /// Relate the number of pit stops to the finishing position
    StopCount(#[clap(flatten)] StopCountArg),
    /// Relate lap-time consistency to the finishing position
    LapConsistency(#[clap(flatten)] LapConsistencyArg),
}

/// Cohort settings overriding the configuration file.
#[derive(Debug, Clone, Args)]
pub(crate) struct CohortArg {
    /// Finishing positions up to this one form the front cohort
    #[arg(long)]
    pub top_num: Option<i64>,

    /// Largest total-stop count to analyse
    #[arg(long)]
    pub max_pit: Option<i64>,
}

impl CohortArg {
    pub fn apply(&self, config: &AnalysisConfig) -> AnalysisConfig {
        AnalysisConfig {
            top_num: self.top_num.unwrap_or(config.top_num),
            max_pit: self.max_pit.unwrap_or(config.max_pit),
            ..config.clone()
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => util::read_json_file("analysis config", path)?,
        None => AnalysisConfig::default(),
    };
    tracing::debug!(?config, "loaded configuration");

    match args.mode {
        Mode::Merge(arg) => merge::run(&arg)?,
        Mode::Process(arg) => process::run(&arg, &config)?,
        Mode::PitOrder(arg) => pit_order::run(&arg, &config)?,
        Mode::FrontBack(arg) => front_back::run(&arg, &config)?,
        Mode::Deviation(arg) => deviation::run(&arg, &config)?,
        Mode::StopCount(arg) => stop_count::run(&arg, &config)?,
        Mode::LapConsistency(arg) => lap_consistency::run(&arg, &config)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
