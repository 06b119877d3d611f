//! Lap-time consistency per driver and race.

use pitwall_frame::{Table, Value};
use pitwall_stats::descriptive::DescriptiveStats;

use crate::{
    AnalysisError,
    config::AnalysisConfig,
    schema::{DRIVER_ID, LAP_TIME_STD, MILLISECONDS, POSITION_ORDER, RACE_ID},
};

/// Sample standard deviation of each driver's lap times, in seconds.
///
/// `lap_times` needs `raceId`, `driverId` and `milliseconds`; `results` needs
/// `raceId`, `driverId` and `positionOrder`. Laps slower than
/// [`AnalysisConfig::lap_time_cutoff_ms`] or without a time are excluded
/// first, so a driver whose laps are all excluded gets no row. A driver with a
/// single remaining lap gets `NaN`.
///
/// The result has the columns `raceId`, `driverId`, `positionOrder` and
/// `lap_time_STD`, sorted by race then finishing position.
pub fn lap_time_consistency(
    lap_times: &Table,
    results: &Table,
    config: &AnalysisConfig,
) -> Result<Table, AnalysisError> {
    let cutoff = cutoff_ms(config);
    let laps = lap_times
        .select(&[RACE_ID, DRIVER_ID, MILLISECONDS])?
        .filter_column(MILLISECONDS, |v| v.as_f64().is_some_and(|ms| ms <= cutoff))?;
    let positions = results.select(&[RACE_ID, DRIVER_ID, POSITION_ORDER])?;
    let joined = laps.inner_join(&positions, &[RACE_ID, DRIVER_ID])?;
    tracing::debug!(
        laps = lap_times.len(),
        kept = laps.len(),
        joined = joined.len(),
        "lap times filtered"
    );

    let ms_index = joined.column_index(MILLISECONDS)?;
    let mut table = Table::new([RACE_ID, DRIVER_ID, POSITION_ORDER, LAP_TIME_STD])?;
    for (mut key, rows) in joined.group_indices(&[RACE_ID, DRIVER_ID, POSITION_ORDER])? {
        let seconds = rows
            .iter()
            .filter_map(|&r| joined.rows()[r][ms_index].as_f64())
            .map(|ms| ms / 1000.0);
        let std_dev = DescriptiveStats::new(seconds).map_or(f64::NAN, |s| s.std_dev);
        key.push(Value::Float(std_dev));
        table.push_row(key)?;
    }
    Ok(table.sort_by_columns(&[RACE_ID, POSITION_ORDER])?)
}

#[expect(clippy::cast_precision_loss)]
fn cutoff_ms(config: &AnalysisConfig) -> f64 {
    config.lap_time_cutoff_ms as f64
}
