//! Pit-stop feature engineering and hypothesis reports.
//!
//! This crate turns the merged Ergast tables into per-stop features and
//! groups them into the cohorts the reports compare.
//!
//! # Overview
//!
//! ## Pit-stop timing workflow
//!
//! 1. **Merge** the raw tables ([`pitwall_frame::merge_tables`]): pit stops, results, status
//! 2. **Derive features** ([`pipeline::FeaturePipeline`]): status filter, `total_laps`,
//!    `total_stops`, `lap_prop`, `abs_deviation`, `abs_deviation_mean`
//! 3. **Group** ([`grouping::pit_order_groups`]): one cohort per total-stop count
//! 4. **Report** ([`report::pit_order_report`], [`report::compare_front_back`]):
//!    distributions per stop number and front/back comparisons
//!
//! ## Stop count workflow
//!
//! 1. **Clean results** ([`seasons::normalize_results`]): keep classified finishers
//! 2. **Count stops** ([`grouping::stop_count_table`]): one row per driver and race
//! 3. **Restrict seasons** ([`seasons::filter_recent_seasons`]) when a window is given
//! 4. **Report** ([`report::stop_count_report`])
//!
//! ## Lap-time consistency workflow
//!
//! 1. **Spread per driver** ([`lap_time::lap_time_consistency`])
//! 2. **Report** ([`report::lap_consistency_report`])
//!
//! # Examples
//!
//! ```
//! use pitwall_analysis::{grouping::pit_order_groups, pipeline::FeaturePipeline};
//! use pitwall_frame::{SuffixIdentifier, csv_io::read_csv, merge_tables};
//!
//! let pit_stops = read_csv(
//!     "raceId,driverId,stop,lap\n1,1,1,2\n1,1,2,5\n1,1,3,8\n1,2,1,10\n".as_bytes(),
//! )?;
//! let results = read_csv(
//!     "raceId,driverId,positionOrder,laps,statusId\n1,1,1,20,1\n1,2,2,20,11\n".as_bytes(),
//! )?;
//!
//! let merged = merge_tables(&[pit_stops, results], &SuffixIdentifier::default())?.table;
//! let enriched = FeaturePipeline::default().run(&merged)?;
//! let groups = pit_order_groups(&enriched)?;
//! assert_eq!(groups[&1].len(), 1);
//! assert_eq!(groups[&3].len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cohort;
pub mod config;
mod error;
pub mod grouping;
pub mod lap_time;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod seasons;

pub use self::error::AnalysisError;
