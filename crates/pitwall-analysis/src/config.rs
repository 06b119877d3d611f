use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Status ids of a normal race completion: "Finished" and "+N Laps".
pub const NORMAL_STATUS_IDS: [i64; 10] = [1, 11, 12, 13, 14, 15, 16, 17, 18, 19];

/// Laps slower than this are treated as outliers (safety car, red flag).
pub const LAP_TIME_CUTOFF_MS: i64 = 360_000;

/// Settings shared by the analyses.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes:
///
/// ```
/// # use pitwall_analysis::config::AnalysisConfig;
/// let config: AnalysisConfig = serde_json::from_str(r#"{ "top_num": 3 }"#).unwrap();
/// assert_eq!(config.top_num, 3);
/// assert_eq!(config.bootstrap_seed, 123);
/// assert!(config.pipeline.status_filter);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pipeline: PipelineConfig,
    /// Lap times above this many milliseconds are excluded.
    pub lap_time_cutoff_ms: i64,
    /// Finishing positions `<= top_num` form the front cohort.
    pub top_num: i64,
    /// Largest total-stop count analysed.
    pub max_pit: i64,
    pub bootstrap_seed: u64,
    pub significance: f64,
    /// Number of histogram bins over `[0, 1]`.
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            lap_time_cutoff_ms: LAP_TIME_CUTOFF_MS,
            top_num: 5,
            max_pit: 3,
            bootstrap_seed: 123,
            significance: 0.05,
            histogram_bins: 49,
        }
    }
}

/// Stage switches of the feature pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Keep only normally completed results.
    pub status_filter: bool,
    /// Derive `total_laps`, `total_stops` and `lap_prop`.
    pub compute_totals: bool,
    /// Derive `abs_deviation` and `abs_deviation_mean`.
    pub compute_deviation: bool,
    pub normal_status_ids: BTreeSet<i64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            status_filter: true,
            compute_totals: true,
            compute_deviation: true,
            normal_status_ids: NORMAL_STATUS_IDS.into_iter().collect(),
        }
    }
}

impl PipelineConfig {
    /// A configuration with every stage switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            status_filter: false,
            compute_totals: false,
            compute_deviation: false,
            ..Self::default()
        }
    }
}
