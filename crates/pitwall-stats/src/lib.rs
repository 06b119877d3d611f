//! Statistical utilities for the pitwall analysis tools.
//!
//! This crate provides the statistics used by the pit-stop reports:
//!
//! - **Descriptive statistics**: count, mean, median, sample variance and spread coverage
//! - **Histogram generation**: equal-width frequency distributions over a fixed range
//! - **Hypothesis tests**: Student/Welch t-test, Mann-Whitney U, Wilcoxon signed-rank,
//!   with tail probabilities from `statrs`
//! - **Bootstrap resampling**: seeded sampling with replacement
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing samples
//! - [`histogram`]: Histogram construction for text distribution plots
//! - [`hypothesis`]: Two-sided tests returning a statistic and p-value
//! - [`bootstrap`]: Resampling with replacement from a deterministic generator
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use pitwall_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.fraction_within(&values, 2.0), 1.0);
//! ```
//!
//! ## Comparing two cohorts
//!
//! ```
//! use pitwall_stats::{
//!     bootstrap::{resample, seeded_rng},
//!     hypothesis::mann_whitney_u,
//! };
//!
//! let front = [0.31, 0.35, 0.29, 0.40];
//! let back = [0.45, 0.52, 0.38, 0.61, 0.49, 0.55, 0.47];
//! let back = resample(&back, front.len(), &mut seeded_rng(123));
//! let result = mann_whitney_u(&front, &back).unwrap();
//! assert!((0.0..=1.0).contains(&result.p_value));
//! ```

pub mod bootstrap;
pub mod descriptive;
pub mod histogram;
pub mod hypothesis;
