use std::path::PathBuf;

use clap::Args;
use pitwall_analysis::{
    config::AnalysisConfig,
    lap_time::lap_time_consistency,
    report::{LapConsistencyReport, lap_consistency_report},
};
use pitwall_stats::descriptive::DescriptiveStats;

use super::display;
use crate::util::{DataArg, LAP_TIMES_CSV, Output, RESULTS_CSV};

#[derive(Debug, Clone, Args)]
pub(crate) struct LapConsistencyArg {
    #[clap(flatten)]
    pub data: DataArg,

    /// Finishing positions up to this one form the front cohort
    #[arg(long)]
    pub top_num: Option<i64>,

    /// Exclude laps slower than this many milliseconds
    #[arg(long)]
    pub cutoff_ms: Option<i64>,

    /// Output CSV file for the per-driver lap-time spread
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also write the report as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &LapConsistencyArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let config = AnalysisConfig {
        top_num: arg.top_num.unwrap_or(config.top_num),
        lap_time_cutoff_ms: arg.cutoff_ms.unwrap_or(config.lap_time_cutoff_ms),
        ..config.clone()
    };
    let lap_times = arg.data.read(LAP_TIMES_CSV)?;
    let results = arg.data.read(RESULTS_CSV)?;

    let table = lap_time_consistency(&lap_times, &results, &config)?;
    let report = lap_consistency_report(&table, config.top_num)?;
    print_report(&report, config.top_num);

    if let Some(path) = &arg.output {
        Output::save_csv(&table, Some(path.clone()))?;
        eprintln!("Lap-time spread saved to: {}", path.display());
    }
    if let Some(path) = &arg.json {
        Output::save_json(&report, Some(path.clone()))?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn print_report(report: &LapConsistencyReport, top_num: i64) {
    display::print_title("Lap Time Consistency by Finishing Position");
    print_cohort(&format!("Top {top_num}"), report.front.as_ref());
    print_cohort("Others", report.back.as_ref());
    println!();
    println!(
        "  Welch t-test p value = {}",
        display::fmt_p_value(report.welch.as_ref())
    );
    println!(
        "  Mann-Whitney U p value = {}",
        display::fmt_p_value(report.mann_whitney.as_ref())
    );
}

fn print_cohort(label: &str, stats: Option<&DescriptiveStats>) {
    match stats {
        Some(stats) => println!(
            "  {label:<8} drivers = {:>6}, mean lap-time std = {} s, median = {} s",
            stats.count,
            display::fmt3(stats.mean),
            display::fmt3(stats.median)
        ),
        None => println!("  {label:<8} no drivers"),
    }
}
