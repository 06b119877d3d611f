use std::path::PathBuf;

use clap::Args;
use pitwall_analysis::config::AnalysisConfig;

use crate::util::{DataArg, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct ProcessArg {
    #[clap(flatten)]
    pub data: DataArg,

    /// Keep results that did not finish normally
    #[arg(long)]
    pub no_status_filter: bool,

    /// Skip total_laps, total_stops and lap_prop
    #[arg(long)]
    pub no_totals: bool,

    /// Skip abs_deviation and abs_deviation_mean
    #[arg(long)]
    pub no_deviation: bool,

    /// Output CSV file (default: stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ProcessArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let mut config = config.clone();
    if arg.no_status_filter {
        config.pipeline.status_filter = false;
    }
    if arg.no_totals {
        config.pipeline.compute_totals = false;
    }
    if arg.no_deviation {
        config.pipeline.compute_deviation = false;
    }

    let table = arg.data.load_enriched(&config)?;
    Output::save_csv(&table, arg.output.clone())
}
