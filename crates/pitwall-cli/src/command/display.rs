//! Text rendering shared by the report commands.

use pitwall_analysis::report::Distribution;
use pitwall_stats::{histogram::Histogram, hypothesis::TestResult};

const BAR_WIDTH: u64 = 40;

pub(super) fn print_title(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
    println!();
}

pub(super) fn print_rule() {
    println!("{}", "-".repeat(88));
}

/// Three decimals, or `N/A` for an undefined value.
pub(super) fn fmt3(value: f64) -> String {
    if value.is_nan() {
        "N/A".to_string()
    } else {
        format!("{value:.3}")
    }
}

pub(super) fn fmt_percent(fraction: f64) -> String {
    if fraction.is_nan() {
        "N/A".to_string()
    } else {
        format!("{:.1}%", fraction * 100.0)
    }
}

pub(super) fn fmt_p_value(result: Option<&TestResult>) -> String {
    result.map_or_else(|| "N/A (sample too small)".to_string(), |r| format!("{:.3e}", r.p_value))
}

pub(super) fn print_distribution(label: &str, distribution: &Distribution) {
    let Some(stats) = &distribution.stats else {
        println!("  {label}: no records");
        return;
    };
    println!(
        "  {label}: n = {}, mean = {}, std = {}",
        stats.count,
        fmt3(stats.mean),
        fmt3(stats.std_dev)
    );
    println!(
        "    {} within mean ± 1 std",
        fmt_percent(distribution.within_one_std)
    );
    println!(
        "    {} within mean ± 2 std",
        fmt_percent(distribution.within_two_std)
    );
}

/// Horizontal bar chart of the non-empty bins.
pub(super) fn print_histogram(histogram: &Histogram) {
    let max_count = histogram.max_count();
    if max_count == 0 {
        return;
    }
    for bin in histogram.bins.iter().filter(|b| b.count > 0) {
        let bar = (bin.count * BAR_WIDTH).div_ceil(max_count);
        println!(
            "    [{:>5.3}, {:>5.3}) {:>6} {}",
            bin.range.start,
            bin.range.end,
            bin.count,
            "#".repeat(usize::try_from(bar).unwrap_or(usize::MAX))
        );
    }
}
