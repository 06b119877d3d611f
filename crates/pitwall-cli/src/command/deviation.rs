use std::path::PathBuf;

use clap::Args;
use pitwall_analysis::{
    cohort::front_back_division,
    config::AnalysisConfig,
    report::{Cohort, ComparisonTest, compare_front_back},
    schema::ABS_DEVIATION_MEAN,
};

use super::{CohortArg, display, front_back::print_comparison};
use crate::util::{DataArg, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct DeviationArg {
    #[clap(flatten)]
    pub data: DataArg,

    #[clap(flatten)]
    pub cohort: CohortArg,

    /// Also write the report as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &DeviationArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let config = arg.cohort.apply(config);
    let table = arg.data.load_enriched(&config)?;
    let splits = front_back_division(
        &table,
        ABS_DEVIATION_MEAN,
        config.max_pit,
        config.top_num,
    )?;
    let comparisons = compare_front_back(&splits, ComparisonTest::MannWhitney, &config);

    display::print_title("Average Deviation from Evenly Spaced Stops");
    for comparison in &comparisons {
        print_comparison(comparison);
        match comparison.lower_mean() {
            Some(Cohort::Front) => {
                println!("  Higher ranking records have significantly lower mean deviations");
            }
            Some(Cohort::Back) => {
                println!("  Lower ranking records have significantly lower mean deviations");
            }
            None => println!(
                "  No significant difference at {}",
                display::fmt3(config.significance)
            ),
        }
    }

    if let Some(path) = &arg.json {
        Output::save_json(&comparisons, Some(path.clone()))?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}
