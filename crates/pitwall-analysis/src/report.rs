//! Hypothesis reports over the groupings.
//!
//! Reports hold raw numbers; rounding happens only when they are displayed.

use std::collections::BTreeMap;

use pitwall_frame::Table;
use pitwall_stats::{
    bootstrap::{resample, seeded_rng},
    descriptive::DescriptiveStats,
    histogram::Histogram,
    hypothesis::{EqualVariance, TestResult, mann_whitney_u, ttest_ind, wilcoxon_signed_rank},
};
use serde::Serialize;

use crate::{
    AnalysisError,
    cohort::CohortSplit,
    config::AnalysisConfig,
    schema::{LAP_PROP, LAP_TIME_STD, POSITION_ORDER, STOP, STOP_COUNT},
};

/// Shape of one sample: summary, coverage of the ±1 and ±2 std bands and a
/// histogram over `[0, 1]`.
#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub stats: Option<DescriptiveStats>,
    pub within_one_std: f64,
    pub within_two_std: f64,
    pub histogram: Histogram,
}

impl Distribution {
    /// Describes `values`, ignoring `NaN`s.
    #[must_use]
    pub fn new(values: &[f64], num_bins: usize) -> Self {
        let values = finite(values);
        let stats = DescriptiveStats::new(values.iter().copied());
        let (within_one_std, within_two_std) = stats.as_ref().map_or((f64::NAN, f64::NAN), |s| {
            (s.fraction_within(&values, 1.0), s.fraction_within(&values, 2.0))
        });
        Self {
            stats,
            within_one_std,
            within_two_std,
            histogram: Histogram::with_range(values, 0.0, 1.0, num_bins.max(1)),
        }
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.stats.as_ref().map_or(f64::NAN, |s| s.mean)
    }
}

/// Lap proportions of the `stop`-th stop among drivers making `total_stops` stops.
#[derive(Debug, Clone, Serialize)]
pub struct StopDistribution {
    pub total_stops: i64,
    pub stop: i64,
    /// `stop / (total_stops + 1)`: where the stop falls under even spacing.
    pub even_spacing: f64,
    pub distribution: Distribution,
    /// Signed-rank test of `lap_prop - even_spacing` against zero.
    pub wilcoxon: Option<TestResult>,
}

/// Distribution of pit-stop timing per cohort and stop number.
///
/// `groups` is the output of [`crate::grouping::pit_order_groups`]; cohorts
/// above its largest key are reported as empty.
pub fn pit_order_report(
    groups: &BTreeMap<i64, Table>,
    config: &AnalysisConfig,
) -> Result<Vec<StopDistribution>, AnalysisError> {
    let mut report = vec![];
    for total_stops in 1..=config.max_pit {
        for stop in 1..=total_stops {
            let lap_props = match groups.get(&total_stops) {
                Some(cohort) => stop_values(cohort, stop)?,
                None => vec![],
            };
            #[expect(clippy::cast_precision_loss)]
            let even_spacing = stop as f64 / (total_stops + 1) as f64;
            let diffs = finite(&lap_props)
                .into_iter()
                .map(|p| p - even_spacing)
                .collect::<Vec<_>>();
            report.push(StopDistribution {
                total_stops,
                stop,
                even_spacing,
                distribution: Distribution::new(&lap_props, config.histogram_bins),
                wilcoxon: wilcoxon_signed_rank(&diffs),
            });
        }
    }
    Ok(report)
}

fn stop_values(cohort: &Table, stop: i64) -> Result<Vec<f64>, AnalysisError> {
    let stop_index = cohort.column_index(STOP)?;
    Ok(cohort
        .filter(|row| row[stop_index].as_i64() == Some(stop))
        .numeric_column(LAP_PROP)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ComparisonTest {
    /// Student's t-test with pooled variance.
    #[default]
    StudentT,
    MannWhitney,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cohort {
    Front,
    Back,
}

/// Front finishers against a same-sized bootstrap sample of back finishers.
#[derive(Debug, Clone, Serialize)]
pub struct CohortComparison {
    pub label: String,
    pub total_stops: i64,
    pub stop: Option<i64>,
    pub front: Distribution,
    /// Distribution of the resampled back cohort.
    pub back: Distribution,
    /// Size of the back cohort before resampling.
    pub back_population: usize,
    pub test: ComparisonTest,
    pub result: Option<TestResult>,
    pub significant: bool,
}

impl CohortComparison {
    /// The cohort with the lower mean when the difference is significant.
    #[must_use]
    pub fn lower_mean(&self) -> Option<Cohort> {
        if !self.significant {
            return None;
        }
        if self.front.mean() < self.back.mean() {
            Some(Cohort::Front)
        } else {
            Some(Cohort::Back)
        }
    }
}

/// Compares every split with `test`.
///
/// Each back cohort is resampled with replacement to the size of its front
/// cohort, from a generator freshly seeded with
/// [`AnalysisConfig::bootstrap_seed`], so every comparison is reproducible on
/// its own.
#[must_use]
pub fn compare_front_back(
    splits: &[CohortSplit],
    test: ComparisonTest,
    config: &AnalysisConfig,
) -> Vec<CohortComparison> {
    splits
        .iter()
        .map(|split| {
            let mut rng = seeded_rng(config.bootstrap_seed);
            let back = resample(&split.back, split.front.len(), &mut rng);
            let result = match test {
                ComparisonTest::StudentT => ttest_ind(&split.front, &back, EqualVariance::Assumed),
                ComparisonTest::MannWhitney => mann_whitney_u(&split.front, &back),
            };
            tracing::debug!(
                cohort = %split.label(),
                front = split.front.len(),
                back = split.back.len(),
                p_value = ?result.map(|r| r.p_value),
                "compared cohorts"
            );
            CohortComparison {
                label: split.label(),
                total_stops: split.total_stops,
                stop: split.stop,
                front: Distribution::new(&split.front, config.histogram_bins),
                back: Distribution::new(&back, config.histogram_bins),
                back_population: split.back.len(),
                test,
                significant: result.is_some_and(|r| r.is_significant(config.significance)),
                result,
            }
        })
        .collect()
}

/// Finishing positions of drivers with a given number of stops.
#[derive(Debug, Clone, Serialize)]
pub struct StopCountSummary {
    pub stop_count: i64,
    pub positions: Option<DescriptiveStats>,
    /// Number of drivers finishing at each position.
    pub position_counts: BTreeMap<i64, u64>,
}

/// Mann-Whitney U test between two consecutive stop counts.
#[derive(Debug, Clone, Serialize)]
pub struct StopCountStep {
    pub lower: i64,
    pub upper: i64,
    pub result: Option<TestResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopCountReport {
    pub summaries: Vec<StopCountSummary>,
    pub steps: Vec<StopCountStep>,
}

/// Relates the number of stops to the finishing position.
///
/// `table` is the output of [`crate::grouping::stop_count_table`].
pub fn stop_count_report(table: &Table, max_stops: i64) -> Result<StopCountReport, AnalysisError> {
    let count_index = table.column_index(STOP_COUNT)?;
    let position_index = table.column_index(POSITION_ORDER)?;

    let positions = (1..=max_stops)
        .map(|count| {
            let positions = table
                .rows()
                .iter()
                .filter(|row| row[count_index].as_i64() == Some(count))
                .filter_map(|row| row[position_index].as_i64())
                .collect::<Vec<_>>();
            (count, positions)
        })
        .collect::<Vec<_>>();

    #[expect(clippy::cast_precision_loss)]
    let as_f64 = |positions: &[i64]| positions.iter().map(|&p| p as f64).collect::<Vec<_>>();

    let summaries = positions
        .iter()
        .map(|(count, positions)| {
            let mut position_counts = BTreeMap::new();
            for &p in positions {
                *position_counts.entry(p).or_insert(0) += 1;
            }
            StopCountSummary {
                stop_count: *count,
                positions: DescriptiveStats::new(as_f64(positions)),
                position_counts,
            }
        })
        .collect();
    let steps = positions
        .windows(2)
        .map(|pair| {
            let (lower, a) = &pair[0];
            let (upper, b) = &pair[1];
            StopCountStep {
                lower: *lower,
                upper: *upper,
                result: mann_whitney_u(&as_f64(a), &as_f64(b)),
            }
        })
        .collect();
    Ok(StopCountReport { summaries, steps })
}

/// Lap-time spread of front and back finishers.
#[derive(Debug, Clone, Serialize)]
pub struct LapConsistencyReport {
    pub front: Option<DescriptiveStats>,
    pub back: Option<DescriptiveStats>,
    pub welch: Option<TestResult>,
    pub mann_whitney: Option<TestResult>,
}

/// Compares `lap_time_STD` of finishers `<= top_num` against the rest.
///
/// `table` is the output of [`crate::lap_time::lap_time_consistency`];
/// drivers with an undefined spread are left out.
pub fn lap_consistency_report(
    table: &Table,
    top_num: i64,
) -> Result<LapConsistencyReport, AnalysisError> {
    let position_index = table.column_index(POSITION_ORDER)?;
    let std_index = table.column_index(LAP_TIME_STD)?;

    let mut front = vec![];
    let mut back = vec![];
    for row in table.rows() {
        let (Some(position), Some(std)) = (row[position_index].as_i64(), row[std_index].as_f64())
        else {
            continue;
        };
        if std.is_nan() {
            continue;
        }
        if position <= top_num {
            front.push(std);
        } else {
            back.push(std);
        }
    }
    Ok(LapConsistencyReport {
        front: DescriptiveStats::new(front.iter().copied()),
        back: DescriptiveStats::new(back.iter().copied()),
        welch: ttest_ind(&front, &back, EqualVariance::NotAssumed),
        mann_whitney: mann_whitney_u(&front, &back),
    })
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

#[cfg(test)]
mod tests {
    use pitwall_frame::Value;

    use crate::schema::{DRIVER_ID, RACE_ID};

    use super::*;

    fn cohort(rows: &[(i64, i64, f64)]) -> Table {
        Table::from_rows(
            [STOP, POSITION_ORDER, LAP_PROP],
            rows.iter()
                .map(|&(stop, position, prop)| {
                    vec![Value::Int(stop), Value::Int(position), Value::Float(prop)]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_pit_order_report_layout() {
        let groups = BTreeMap::from([
            (1, cohort(&[(1, 1, 0.4), (1, 2, 0.5), (1, 3, 0.6)])),
            (2, cohort(&[(1, 1, 0.3), (2, 1, 0.7)])),
        ]);
        let report = pit_order_report(&groups, &AnalysisConfig::default()).unwrap();
        let keys = report
            .iter()
            .map(|d| (d.total_stops, d.stop))
            .collect::<Vec<_>>();
        assert_eq!(keys, [(1, 1), (2, 1), (2, 2), (3, 1), (3, 2), (3, 3)]);

        let single = &report[0];
        assert_eq!(single.even_spacing, 0.5);
        let stats = single.distribution.stats.as_ref().unwrap();
        assert!((stats.mean - 0.5).abs() < 1e-12);
        assert_eq!(single.distribution.histogram.total(), 3);
        assert_eq!(single.distribution.histogram.bins.len(), 49);

        // no drivers with three stops
        assert!(report[5].distribution.stats.is_none());
        assert!(report[5].wilcoxon.is_none());
    }

    #[test]
    fn test_comparison_is_reproducible() {
        let split = CohortSplit {
            total_stops: 1,
            stop: Some(1),
            front: vec![0.30, 0.35, 0.32, 0.31, 0.29, 0.33],
            back: vec![0.50, 0.55, 0.48, 0.61, 0.52, 0.58, 0.49, 0.57],
        };
        let config = AnalysisConfig::default();
        let a = compare_front_back(std::slice::from_ref(&split), ComparisonTest::MannWhitney, &config);
        let b = compare_front_back(std::slice::from_ref(&split), ComparisonTest::MannWhitney, &config);
        assert_eq!(a[0].result, b[0].result);
        assert_eq!(a[0].back.stats.as_ref().unwrap().count, 6);
        assert_eq!(a[0].back_population, 8);
        assert!(a[0].significant);
        assert_eq!(a[0].lower_mean(), Some(Cohort::Front));
    }

    #[test]
    fn test_comparison_with_empty_back() {
        let split = CohortSplit {
            total_stops: 3,
            stop: Some(3),
            front: vec![0.8, 0.9],
            back: vec![],
        };
        let comparisons =
            compare_front_back(&[split], ComparisonTest::StudentT, &AnalysisConfig::default());
        assert!(comparisons[0].result.is_none());
        assert!(!comparisons[0].significant);
        assert_eq!(comparisons[0].lower_mean(), None);
    }

    #[test]
    fn test_stop_count_report() {
        let table = Table::from_rows(
            [RACE_ID, DRIVER_ID, POSITION_ORDER, STOP_COUNT],
            [(1, 1, 1, 1), (1, 2, 2, 1), (1, 3, 3, 2), (1, 4, 4, 2), (1, 5, 5, 2)]
                .iter()
                .map(|&(r, d, p, c)| vec![Value::Int(r), Value::Int(d), Value::Int(p), Value::Int(c)])
                .collect(),
        )
        .unwrap();
        let report = stop_count_report(&table, 3).unwrap();
        assert_eq!(report.summaries.len(), 3);
        assert_eq!(report.summaries[0].positions.as_ref().unwrap().mean, 1.5);
        assert_eq!(report.summaries[1].position_counts, BTreeMap::from([(3, 1), (4, 1), (5, 1)]));
        assert!(report.summaries[2].positions.is_none());

        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].result.unwrap().statistic, 0.0);
        assert!(report.steps[1].result.is_none());
    }

    #[test]
    fn test_lap_consistency_drops_nan() {
        let table = Table::from_rows(
            [POSITION_ORDER, LAP_TIME_STD],
            vec![
                vec![Value::Int(1), Value::Float(1.0)],
                vec![Value::Int(2), Value::Float(1.2)],
                vec![Value::Int(3), Value::Float(f64::NAN)],
                vec![Value::Int(8), Value::Float(2.0)],
                vec![Value::Int(9), Value::Float(2.4)],
            ],
        )
        .unwrap();
        let report = lap_consistency_report(&table, 5).unwrap();
        assert_eq!(report.front.as_ref().unwrap().count, 2);
        assert_eq!(report.back.as_ref().unwrap().count, 2);
        assert!(report.welch.is_some());
        assert_eq!(report.mann_whitney.unwrap().statistic, 0.0);
    }
}
