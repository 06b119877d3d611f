//! Cohort groupings of the enriched table.

use std::collections::BTreeMap;

use pitwall_frame::{Aggregation, Table, TableError};

use crate::schema::{DRIVER_ID, LAP_PROP, POSITION_ORDER, RACE_ID, STOP, STOP_COUNT, TOTAL_STOPS};

/// Columns kept in each pit-order cohort.
pub const PIT_ORDER_COLUMNS: [&str; 3] = [STOP, POSITION_ORDER, LAP_PROP];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    /// One table per total-stop count, see [`pit_order_groups`].
    PitOrder,
    /// One row per driver and race, see [`stop_count_table`].
    TotalStops,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Grouping {
    PitOrder(BTreeMap<i64, Table>),
    TotalStops(Table),
}

pub fn group(table: &Table, mode: GroupingMode) -> Result<Grouping, TableError> {
    match mode {
        GroupingMode::PitOrder => pit_order_groups(table).map(Grouping::PitOrder),
        GroupingMode::TotalStops => stop_count_table(table).map(Grouping::TotalStops),
    }
}

/// Splits enriched records by `total_stops`.
///
/// Keys run from `1` to the largest `total_stops` present, and every key is
/// present even when no record has that count. Each cohort is projected to
/// `stop`, `positionOrder` and `lap_prop`.
///
/// # Examples
///
/// ```
/// use pitwall_analysis::grouping::pit_order_groups;
/// use pitwall_frame::{Table, Value};
///
/// let table = Table::from_rows(
///     ["total_stops", "stop", "positionOrder", "lap_prop"],
///     vec![
///         vec![Value::Int(3), Value::Int(1), Value::Int(4), Value::Float(0.2)],
///         vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Float(0.5)],
///     ],
/// )?;
/// let groups = pit_order_groups(&table)?;
/// assert_eq!(groups.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// assert!(groups[&2].is_empty());
/// assert_eq!(groups[&3].columns(), ["stop", "positionOrder", "lap_prop"]);
/// # Ok::<(), pitwall_frame::TableError>(())
/// ```
pub fn pit_order_groups(table: &Table) -> Result<BTreeMap<i64, Table>, TableError> {
    let total_index = table.column_index(TOTAL_STOPS)?;
    let projected = table.column_indices(&PIT_ORDER_COLUMNS)?;
    let Some(max) = table
        .rows()
        .iter()
        .filter_map(|row| row[total_index].as_i64())
        .max()
    else {
        return Ok(BTreeMap::new());
    };

    let mut groups = (1..=max)
        .map(|total| Ok((total, Table::new(PIT_ORDER_COLUMNS)?)))
        .collect::<Result<BTreeMap<_, _>, TableError>>()?;
    for row in table.rows() {
        let Some(cohort) = row[total_index].as_i64().and_then(|t| groups.get_mut(&t)) else {
            continue;
        };
        cohort.push_row(projected.iter().map(|&i| row[i].clone()).collect())?;
    }
    Ok(groups)
}

/// Number of pit stops of every driver in every race.
///
/// One row per (`raceId`, `driverId`, `positionOrder`) with a `stop_count`
/// column counting non-missing `stop` values, sorted by race then driver.
pub fn stop_count_table(table: &Table) -> Result<Table, TableError> {
    table.aggregate(
        &[RACE_ID, DRIVER_ID, POSITION_ORDER],
        STOP,
        Aggregation::Count,
        STOP_COUNT,
    )
}

#[cfg(test)]
mod tests {
    use pitwall_frame::Value;

    use super::*;

    fn enriched() -> Table {
        let rows = [
            // raceId, driverId, positionOrder, stop, total_stops, lap_prop
            (2, 5, 1, 1, 2, 0.3),
            (2, 5, 1, 2, 2, 0.6),
            (1, 7, 3, 1, 1, 0.5),
            (1, 4, 2, 1, 2, 0.35),
            (1, 4, 2, 2, 2, 0.7),
        ];
        Table::from_rows(
            [RACE_ID, DRIVER_ID, POSITION_ORDER, STOP, TOTAL_STOPS, LAP_PROP],
            rows.iter()
                .map(|&(race, driver, position, stop, total, prop)| {
                    vec![
                        Value::Int(race),
                        Value::Int(driver),
                        Value::Int(position),
                        Value::Int(stop),
                        Value::Int(total),
                        Value::Float(prop),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_pit_order_groups() {
        let groups = pit_order_groups(&enriched()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&1].len(), 1);
        assert_eq!(groups[&2].len(), 4);
        assert_eq!(
            groups[&1].rows()[0],
            vec![Value::Int(1), Value::Int(3), Value::Float(0.5)]
        );
    }

    #[test]
    fn test_pit_order_groups_of_empty_table() {
        let empty = Table::new([TOTAL_STOPS, STOP, POSITION_ORDER, LAP_PROP]).unwrap();
        assert!(pit_order_groups(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_stop_count_one_row_per_driver_race() {
        let table = stop_count_table(&enriched()).unwrap();
        assert_eq!(
            table.columns(),
            [RACE_ID, DRIVER_ID, POSITION_ORDER, STOP_COUNT]
        );
        let rows = table
            .rows()
            .iter()
            .map(|row| row.iter().filter_map(Value::as_i64).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(rows, [[1, 4, 2, 2], [1, 7, 3, 1], [2, 5, 1, 2]]);
    }

    #[test]
    fn test_stop_count_ignores_missing_stops() {
        let table = Table::from_rows(
            [RACE_ID, DRIVER_ID, POSITION_ORDER, STOP],
            vec![
                vec![Value::Int(1), Value::Int(1), Value::Int(1), Value::Null],
                vec![Value::Int(1), Value::Int(1), Value::Int(1), Value::Int(1)],
            ],
        )
        .unwrap();
        let counts = stop_count_table(&table).unwrap();
        assert_eq!(counts.get(0, STOP_COUNT).unwrap(), Some(&Value::Int(1)));
    }

    #[test]
    fn test_group_dispatch() {
        let table = enriched();
        assert!(matches!(
            group(&table, GroupingMode::PitOrder).unwrap(),
            Grouping::PitOrder(groups) if groups.len() == 2
        ));
        assert!(matches!(
            group(&table, GroupingMode::TotalStops).unwrap(),
            Grouping::TotalStops(counts) if counts.len() == 3
        ));
    }
}
