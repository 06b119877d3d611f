use std::path::PathBuf;

use clap::Args;
use pitwall_analysis::{
    config::AnalysisConfig,
    grouping::pit_order_groups,
    report::{StopDistribution, pit_order_report},
};

use super::display;
use crate::util::{DataArg, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct PitOrderArg {
    #[clap(flatten)]
    pub data: DataArg,

    /// Largest total-stop count to analyse
    #[arg(long)]
    pub max_pit: Option<i64>,

    /// Also write the report as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &PitOrderArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let config = AnalysisConfig {
        max_pit: arg.max_pit.unwrap_or(config.max_pit),
        ..config.clone()
    };
    let table = arg.data.load_enriched(&config)?;
    let groups = pit_order_groups(&table)?;
    let report = pit_order_report(&groups, &config)?;

    display::print_title("Pit Stop Timing by Total Pit Stops");
    let mut current_total = None;
    for distribution in &report {
        if current_total != Some(distribution.total_stops) {
            current_total = Some(distribution.total_stops);
            display::print_rule();
            println!("Total Pit Stops: {}", distribution.total_stops);
        }
        print_stop(distribution);
    }

    if let Some(path) = &arg.json {
        Output::save_json(&report, Some(path.clone()))?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn print_stop(distribution: &StopDistribution) {
    let label = format!("No.{} pit stop", distribution.stop);
    display::print_distribution(&label, &distribution.distribution);
    println!(
        "    even spacing at {}, Wilcoxon signed-rank p = {}",
        display::fmt3(distribution.even_spacing),
        display::fmt_p_value(distribution.wilcoxon.as_ref())
    );
    display::print_histogram(&distribution.distribution.histogram);
}
