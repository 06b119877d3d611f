//! Feature derivation over the merged pit-stop table.
//!
//! The pipeline is an ordered list of [`Stage`]s. Each stage borrows a table
//! and returns a new one with a filter applied or one column added:
//!
//! | Stage              | Adds                 | Needs                                     |
//! |--------------------|----------------------|-------------------------------------------|
//! | `StatusFilter`     | (drops rows)         | `statusId`                                |
//! | `TotalLaps`        | `total_laps`         | `raceId`, `positionOrder`, `stop`, `laps` |
//! | `TotalStops`       | `total_stops`        | `raceId`, `driverId`, `stop`              |
//! | `LapProportion`    | `lap_prop`           | `lap`, `total_laps`                       |
//! | `AbsDeviation`     | `abs_deviation`      | `stop`, `total_stops`, `lap_prop`         |
//! | `DeviationMean`    | `abs_deviation_mean` | `raceId`, `driverId`, `abs_deviation`     |
//!
//! Aggregates are inner-joined back, so rows whose race has no winner's
//! first stop, or whose keys are missing, leave the table at that point.

use std::collections::BTreeSet;

use pitwall_frame::{Aggregation, Table, TableError, Value};

use crate::{
    config::PipelineConfig,
    schema::{
        ABS_DEVIATION, ABS_DEVIATION_MEAN, DRIVER_ID, LAP, LAP_PROP, LAPS, POSITION_ORDER,
        RACE_ID, STATUS_ID, STOP, TOTAL_LAPS, TOTAL_STOPS,
    },
};

/// A single derivation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Stage {
    #[display("status-filter")]
    StatusFilter,
    #[display("total-laps")]
    TotalLaps,
    #[display("total-stops")]
    TotalStops,
    #[display("lap-proportion")]
    LapProportion,
    #[display("abs-deviation")]
    AbsDeviation,
    #[display("deviation-mean")]
    DeviationMean,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Self; 6] = [
        Self::StatusFilter,
        Self::TotalLaps,
        Self::TotalStops,
        Self::LapProportion,
        Self::AbsDeviation,
        Self::DeviationMean,
    ];

    /// Column added by this stage; `None` for the status filter.
    #[must_use]
    pub fn output_column(self) -> Option<&'static str> {
        match self {
            Self::StatusFilter => None,
            Self::TotalLaps => Some(TOTAL_LAPS),
            Self::TotalStops => Some(TOTAL_STOPS),
            Self::LapProportion => Some(LAP_PROP),
            Self::AbsDeviation => Some(ABS_DEVIATION),
            Self::DeviationMean => Some(ABS_DEVIATION_MEAN),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PipelineError {
    #[display("{stage} stage failed: {source}")]
    Stage { stage: Stage, source: TableError },
}

/// Runs the enabled stages of a [`PipelineConfig`] in order.
///
/// # Examples
///
/// ```
/// use pitwall_analysis::{config::PipelineConfig, pipeline::{FeaturePipeline, Stage}};
///
/// let pipeline = FeaturePipeline::new(PipelineConfig {
///     compute_deviation: false,
///     ..PipelineConfig::default()
/// });
/// assert_eq!(
///     pipeline.stages(),
///     [Stage::StatusFilter, Stage::TotalLaps, Stage::TotalStops, Stage::LapProportion]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The enabled stages in execution order.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|&stage| self.is_enabled(stage))
            .collect()
    }

    fn is_enabled(&self, stage: Stage) -> bool {
        match stage {
            Stage::StatusFilter => self.config.status_filter,
            Stage::TotalLaps | Stage::TotalStops | Stage::LapProportion => {
                self.config.compute_totals
            }
            Stage::AbsDeviation | Stage::DeviationMean => self.config.compute_deviation,
        }
    }

    /// Runs every enabled stage. With no stage enabled the input is returned unchanged.
    pub fn run(&self, table: &Table) -> Result<Table, PipelineError> {
        let mut current = table.clone();
        for stage in self.stages() {
            current = self.run_stage(stage, &current)?;
            tracing::debug!(%stage, rows = current.len(), "pipeline stage finished");
        }
        Ok(current)
    }

    /// Runs one stage regardless of the switches.
    pub fn run_stage(&self, stage: Stage, table: &Table) -> Result<Table, PipelineError> {
        let result = match stage {
            Stage::StatusFilter => filter_normal_status(table, &self.config.normal_status_ids),
            Stage::TotalLaps => add_total_laps(table),
            Stage::TotalStops => add_total_stops(table),
            Stage::LapProportion => add_lap_proportion(table),
            Stage::AbsDeviation => add_abs_deviation(table),
            Stage::DeviationMean => add_deviation_mean(table),
        };
        result.map_err(|source| PipelineError::Stage { stage, source })
    }
}

/// Keeps the rows whose `statusId` is in `normal_ids`.
pub fn filter_normal_status(table: &Table, normal_ids: &BTreeSet<i64>) -> Result<Table, TableError> {
    table.filter_column(STATUS_ID, |v| {
        v.as_i64().is_some_and(|id| normal_ids.contains(&id))
    })
}

/// Race length taken from the winner's first-stop row.
pub fn add_total_laps(table: &Table) -> Result<Table, TableError> {
    let position = table.column_index(POSITION_ORDER)?;
    let stop = table.column_index(STOP)?;
    let winners = table
        .filter(|row| row[position].as_i64() == Some(1) && row[stop].as_i64() == Some(1))
        .select(&[RACE_ID, LAPS])?
        .rename(LAPS, TOTAL_LAPS)?;
    table.inner_join(&winners, &[RACE_ID])
}

/// Highest stop number per driver and race.
pub fn add_total_stops(table: &Table) -> Result<Table, TableError> {
    let totals = table.aggregate(&[RACE_ID, DRIVER_ID], STOP, Aggregation::Max, TOTAL_STOPS)?;
    table.inner_join(&totals, &[RACE_ID, DRIVER_ID])
}

/// `lap / total_laps`.
pub fn add_lap_proportion(table: &Table) -> Result<Table, TableError> {
    let lap = table.column_index(LAP)?;
    let total_laps = table.column_index(TOTAL_LAPS)?;
    table.with_column(LAP_PROP, |row| {
        match (number(&row[lap]), number(&row[total_laps])) {
            (Some(lap), Some(total)) => Value::Float(lap / total),
            _ => Value::Null,
        }
    })
}

/// `|stop / (total_stops + 1) - lap_prop|`: distance from evenly spaced stops.
pub fn add_abs_deviation(table: &Table) -> Result<Table, TableError> {
    let stop = table.column_index(STOP)?;
    let total_stops = table.column_index(TOTAL_STOPS)?;
    let lap_prop = table.column_index(LAP_PROP)?;
    table.with_column(ABS_DEVIATION, |row| {
        match (
            number(&row[stop]),
            number(&row[total_stops]),
            number(&row[lap_prop]),
        ) {
            (Some(stop), Some(total), Some(prop)) => {
                Value::Float((stop / (total + 1.0) - prop).abs())
            }
            _ => Value::Null,
        }
    })
}

/// Mean `abs_deviation` per driver and race.
pub fn add_deviation_mean(table: &Table) -> Result<Table, TableError> {
    let means = table.aggregate(
        &[RACE_ID, DRIVER_ID],
        ABS_DEVIATION,
        Aggregation::Mean,
        ABS_DEVIATION_MEAN,
    )?;
    table.inner_join(&means, &[RACE_ID, DRIVER_ID])
}

fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: [&str; 7] = [
        RACE_ID,
        DRIVER_ID,
        STOP,
        LAP,
        POSITION_ORDER,
        STATUS_ID,
        LAPS,
    ];

    fn row(values: [i64; 7]) -> Vec<Value> {
        values.into_iter().map(Value::Int).collect()
    }

    fn merged() -> Table {
        Table::from_rows(
            COLUMNS,
            vec![
                // race 1: the winner stops at laps 2, 5 and 8 of 20
                row([1, 10, 1, 2, 1, 1, 20]),
                row([1, 10, 2, 5, 1, 1, 20]),
                row([1, 10, 3, 8, 1, 1, 20]),
                row([1, 11, 1, 10, 2, 11, 19]),
                row([1, 12, 1, 3, 3, 4, 3]),
                // race 2: the winner never stopped
                row([2, 20, 1, 7, 2, 1, 40]),
            ],
        )
        .unwrap()
    }

    fn floats(table: &Table, column: &str) -> Vec<f64> {
        table.numeric_column(column).unwrap()
    }

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn test_evenly_spaced_features() {
        let table = FeaturePipeline::default().run(&merged()).unwrap();
        let winner = table
            .filter_column(DRIVER_ID, |v| v.as_i64() == Some(10))
            .unwrap();

        assert_all_close(&floats(&winner, LAP_PROP), &[0.1, 0.25, 0.4]);
        assert_all_close(&floats(&winner, TOTAL_STOPS), &[3.0, 3.0, 3.0]);
        assert_all_close(&floats(&winner, TOTAL_LAPS), &[20.0, 20.0, 20.0]);
        assert_all_close(&floats(&winner, ABS_DEVIATION), &[0.15, 0.25, 0.35]);
        assert_all_close(&floats(&winner, ABS_DEVIATION_MEAN), &[0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_column_order() {
        let table = FeaturePipeline::default().run(&merged()).unwrap();
        let derived = &table.columns()[COLUMNS.len()..];
        assert_eq!(
            derived,
            [TOTAL_LAPS, TOTAL_STOPS, LAP_PROP, ABS_DEVIATION, ABS_DEVIATION_MEAN]
        );
    }

    #[test]
    fn test_status_filter() {
        let mut input = merged();
        input
            .push_row(vec![
                Value::Int(1),
                Value::Int(13),
                Value::Int(1),
                Value::Int(4),
                Value::Int(4),
                Value::Null,
                Value::Int(20),
            ])
            .unwrap();
        let pipeline = FeaturePipeline::default();
        let filtered = pipeline.run_stage(Stage::StatusFilter, &input).unwrap();
        let drivers = filtered
            .column(DRIVER_ID)
            .unwrap()
            .filter_map(Value::as_i64)
            .collect::<Vec<_>>();
        assert_eq!(drivers, [10, 10, 10, 11, 20]);
    }

    #[test]
    fn test_race_without_winner_stop_is_dropped() {
        let table = add_total_laps(&merged()).unwrap();
        assert!(
            table
                .column(RACE_ID)
                .unwrap()
                .all(|v| v.as_i64() == Some(1))
        );
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_all_switches_off_is_identity() {
        let pipeline = FeaturePipeline::new(PipelineConfig::disabled());
        assert!(pipeline.stages().is_empty());
        assert_eq!(pipeline.run(&merged()).unwrap(), merged());
    }

    #[test]
    fn test_deviation_without_totals_fails() {
        let pipeline = FeaturePipeline::new(PipelineConfig {
            compute_totals: false,
            ..PipelineConfig::default()
        });
        let err = pipeline.run(&merged()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Stage {
                stage: Stage::AbsDeviation,
                source: TableError::MissingColumn { .. },
            }
        ));
    }

    #[test]
    fn test_null_operands_give_null() {
        let table = Table::from_rows(
            [LAP, TOTAL_LAPS],
            vec![
                vec![Value::Null, Value::Int(50)],
                vec![Value::Int(10), Value::Float(f64::NAN)],
                vec![Value::Int(10), Value::Int(50)],
            ],
        )
        .unwrap();
        let table = add_lap_proportion(&table).unwrap();
        let props = table.column(LAP_PROP).unwrap().cloned().collect::<Vec<_>>();
        assert_eq!(props, [Value::Null, Value::Null, Value::Float(0.2)]);
    }

    #[test]
    fn test_stage_output_columns() {
        let columns = Stage::ALL
            .into_iter()
            .filter_map(Stage::output_column)
            .collect::<Vec<_>>();
        assert_eq!(
            columns,
            [TOTAL_LAPS, TOTAL_STOPS, LAP_PROP, ABS_DEVIATION, ABS_DEVIATION_MEAN]
        );
    }
}
