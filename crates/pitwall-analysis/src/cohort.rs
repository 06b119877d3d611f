//! Front/back cohort division by finishing position.

use pitwall_frame::{Table, Value};
use serde::Serialize;

use crate::{
    AnalysisError,
    schema::{ABS_DEVIATION_MEAN, DRIVER_ID, POSITION_ORDER, RACE_ID, STOP, TOTAL_STOPS},
};

/// Values of one column for the front and back finishers of one cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSplit {
    pub total_stops: i64,
    /// Stop number within the race; `None` for per-driver columns.
    pub stop: Option<i64>,
    /// Values of finishers with `positionOrder <= top_num`.
    pub front: Vec<f64>,
    /// Values of the remaining finishers.
    pub back: Vec<f64>,
}

impl CohortSplit {
    #[must_use]
    pub fn label(&self) -> String {
        match self.stop {
            Some(stop) => format!("total stops {}, stop #{stop}", self.total_stops),
            None => format!("total stops {}", self.total_stops),
        }
    }
}

/// Splits `column` into front and back cohorts.
///
/// For per-stop columns such as `lap_prop` there is one split per
/// (total stops, stop number) with total stops in `1..=max_pit`, ordered
/// `(1, 1), (2, 1), (2, 2), (3, 1), ...`. For `abs_deviation_mean`, which is
/// constant within a driver's race, rows are first reduced to one per driver
/// and race, and there is one split per total-stop count.
///
/// Missing values become `NaN`.
pub fn front_back_division(
    table: &Table,
    column: &str,
    max_pit: i64,
    top_num: i64,
) -> Result<Vec<CohortSplit>, AnalysisError> {
    if column == ABS_DEVIATION_MEAN {
        let per_driver = table
            .select(&[RACE_ID, DRIVER_ID, TOTAL_STOPS, POSITION_ORDER, ABS_DEVIATION_MEAN])?
            .distinct();
        return (1..=max_pit)
            .map(|total| split(&per_driver, column, total, None, top_num))
            .collect();
    }

    let mut splits = vec![];
    for total in 1..=max_pit {
        for stop in 1..=total {
            splits.push(split(table, column, total, Some(stop), top_num)?);
        }
    }
    Ok(splits)
}

fn split(
    table: &Table,
    column: &str,
    total_stops: i64,
    stop: Option<i64>,
    top_num: i64,
) -> Result<CohortSplit, AnalysisError> {
    let total_index = table.column_index(TOTAL_STOPS)?;
    let position_index = table.column_index(POSITION_ORDER)?;
    let value_index = table.column_index(column)?;
    let stop_index = stop.map(|_| table.column_index(STOP)).transpose()?;

    let mut front = vec![];
    let mut back = vec![];
    for row in table.rows() {
        if row[total_index].as_i64() != Some(total_stops) {
            continue;
        }
        if let Some(i) = stop_index
            && row[i].as_i64() != stop
        {
            continue;
        }
        let Some(position) = row[position_index].as_i64() else {
            continue;
        };
        let value = value_as_f64(&row[value_index]);
        if position <= top_num {
            front.push(value);
        } else {
            back.push(value);
        }
    }
    Ok(CohortSplit {
        total_stops,
        stop,
        front,
        back,
    })
}

fn value_as_f64(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}
