use std::path::PathBuf;

use clap::Args;
use pitwall_analysis::{
    cohort::front_back_division,
    config::AnalysisConfig,
    report::{CohortComparison, ComparisonTest, compare_front_back},
    schema::LAP_PROP,
};

use super::{CohortArg, display};
use crate::util::{DataArg, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct FrontBackArg {
    #[clap(flatten)]
    pub data: DataArg,

    /// Numeric column to compare
    #[arg(long, default_value = LAP_PROP)]
    pub column: String,

    #[clap(flatten)]
    pub cohort: CohortArg,

    /// Use the Mann-Whitney U test instead of Student's t-test
    #[arg(long)]
    pub non_parametric: bool,

    /// Also write the report as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &FrontBackArg, config: &AnalysisConfig) -> anyhow::Result<()> {
    let config = arg.cohort.apply(config);
    let table = arg.data.load_enriched(&config)?;
    let splits = front_back_division(&table, &arg.column, config.max_pit, config.top_num)?;
    let test = if arg.non_parametric {
        ComparisonTest::MannWhitney
    } else {
        ComparisonTest::StudentT
    };
    let comparisons = compare_front_back(&splits, test, &config);

    display::print_title(&format!(
        "Front (top {}) vs Back Finishers: {}",
        config.top_num, arg.column
    ));
    for comparison in &comparisons {
        print_comparison(comparison);
    }

    if let Some(path) = &arg.json {
        Output::save_json(&comparisons, Some(path.clone()))?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

pub(super) fn print_comparison(comparison: &CohortComparison) {
    display::print_rule();
    println!("{}", comparison.label);
    display::print_distribution("Higher ranking", &comparison.front);
    display::print_distribution(
        &format!("Lower ranking (resampled from {})", comparison.back_population),
        &comparison.back,
    );
    if let Some(stop) = comparison.stop {
        #[expect(clippy::cast_precision_loss)]
        let even_spacing = stop as f64 / (comparison.total_stops + 1) as f64;
        println!("  even spacing at {}", display::fmt3(even_spacing));
    }
    let test_name = match comparison.test {
        ComparisonTest::StudentT => "t-test",
        ComparisonTest::MannWhitney => "Mann-Whitney U",
    };
    println!(
        "  {test_name} p value = {}",
        display::fmt_p_value(comparison.result.as_ref())
    );
}
