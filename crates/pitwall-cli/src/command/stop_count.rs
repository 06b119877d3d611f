use std::path::PathBuf;

use chrono::Datelike as _;
use clap::Args;
use pitwall_analysis::{
    config::AnalysisConfig,
    grouping::stop_count_table,
    report::{StopCountReport, stop_count_report},
    schema::{DRIVER_ID, POSITION, POSITION_ORDER, RACE_ID, STOP, YEAR},
    seasons::{filter_recent_seasons, normalize_results},
};
use pitwall_frame::csv_io::MISSING_MARKER;

use super::display;
use crate::util::{DataArg, Output, PIT_STOPS_CSV, RACES_CSV, RESULTS_CSV};

#[derive(Debug, Clone, Args)]
pub(crate) struct StopCountArg {
    #[clap(flatten)]
    pub data: DataArg,

    /// Only use races from the last N seasons (needs races.csv)
    #[arg(long)]
    pub recent_years: Option<i64>,

    /// Largest stop count to report
    #[arg(long)]
    pub max_stops: Option<i64>,

    /// Output CSV file for the per-driver stop counts
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also write the report as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &StopCountArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let pit_stops = arg.data.read(PIT_STOPS_CSV)?;
    let results = normalize_results(&arg.data.read(RESULTS_CSV)?, POSITION, MISSING_MARKER)?;

    let mut stops = pit_stops.select(&[RACE_ID, DRIVER_ID, STOP])?.inner_join(
        &results.select(&[RACE_ID, DRIVER_ID, POSITION_ORDER])?,
        &[RACE_ID, DRIVER_ID],
    )?;
    if let Some(window) = arg.recent_years {
        let races = arg.data.read(RACES_CSV)?.select(&[RACE_ID, YEAR])?;
        let current_year = i64::from(chrono::Local::now().year());
        let with_year = stops.inner_join(&races, &[RACE_ID])?;
        stops = filter_recent_seasons(&with_year, current_year, window)?;
        eprintln!(
            "Kept {} of {} pit stops from seasons {}..={current_year}",
            stops.len(),
            with_year.len(),
            current_year - window
        );
    }

    let counts = stop_count_table(&stops)?;
    let report = stop_count_report(&counts, arg.max_stops.unwrap_or(config.max_pit))?;
    print_report(&report);

    if let Some(path) = &arg.output {
        Output::save_csv(&counts, Some(path.clone()))?;
        eprintln!("Stop counts saved to: {}", path.display());
    }
    if let Some(path) = &arg.json {
        Output::save_json(&report, Some(path.clone()))?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn print_report(report: &StopCountReport) {
    display::print_title("Finishing Position by Number of Pit Stops");
    println!(
        "  {:<12} {:>8} {:>10} {:>10} {:>10}",
        "Pit stops", "Drivers", "Mean pos", "Median", "Std"
    );
    println!("  {}", "-".repeat(54));
    for summary in &report.summaries {
        match &summary.positions {
            Some(stats) => println!(
                "  {:<12} {:>8} {:>10} {:>10} {:>10}",
                summary.stop_count,
                stats.count,
                display::fmt3(stats.mean),
                display::fmt3(stats.median),
                display::fmt3(stats.std_dev),
            ),
            None => println!("  {:<12} {:>8}", summary.stop_count, 0),
        }
    }
    println!();

    for summary in report.summaries.iter().filter(|s| !s.position_counts.is_empty()) {
        let counts = summary
            .position_counts
            .iter()
            .map(|(position, count)| format!("P{position}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  pit stops = {}: {counts}", summary.stop_count);
    }
    println!();

    for step in &report.steps {
        println!(
            "  {} vs {} stops: Mann-Whitney U p value = {}",
            step.lower,
            step.upper,
            display::fmt_p_value(step.result.as_ref())
        );
    }
}
