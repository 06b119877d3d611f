//! Season filtering and result cleanup.

use pitwall_frame::{Table, Value};

use crate::{AnalysisError, schema::YEAR};

/// Keeps rows from the last `window` seasons: `current_year - year <= window`.
///
/// Rows without a `year` are dropped.
///
/// # Examples
///
/// ```
/// use pitwall_analysis::seasons::filter_recent_seasons;
/// use pitwall_frame::{Table, Value};
///
/// let races = Table::from_rows(
///     ["raceId", "year"],
///     vec![
///         vec![Value::Int(1), Value::Int(2011)],
///         vec![Value::Int(2), Value::Int(2016)],
///     ],
/// )?;
/// let recent = filter_recent_seasons(&races, 2026, 10)?;
/// assert_eq!(recent.len(), 1);
/// # Ok::<(), pitwall_analysis::AnalysisError>(())
/// ```
pub fn filter_recent_seasons(
    table: &Table,
    current_year: i64,
    window: i64,
) -> Result<Table, AnalysisError> {
    Ok(table.filter_column(YEAR, |v| {
        v.as_i64().is_some_and(|year| current_year - year <= window)
    })?)
}

/// Drops rows whose `column` is missing or equal to `missing`, and stores the
/// remaining values as integers.
///
/// `results.csv` marks unclassified drivers with `\N` in `position`; after
/// this only classified finishers remain.
pub fn normalize_results(
    results: &Table,
    column: &str,
    missing: &str,
) -> Result<Table, AnalysisError> {
    let index = results.column_index(column)?;
    let kept = results.filter(|row| match &row[index] {
        Value::Str(s) => s != missing,
        value => !value.is_missing(),
    });

    let mut table = Table::new(kept.columns().iter().cloned())?;
    for (row_index, row) in kept.rows().iter().enumerate() {
        let value = &row[index];
        let integer = match value {
            Value::Str(s) => s.trim().parse::<i64>().ok(),
            other => other.as_i64(),
        }
        .ok_or_else(|| AnalysisError::NotInteger {
            column: column.to_owned(),
            row: row_index,
            value: value.clone(),
        })?;
        let mut row = row.clone();
        row[index] = Value::Int(integer);
        table.push_row(row)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Table {
        Table::from_rows(
            ["raceId", "driverId", "position"],
            vec![
                vec![Value::Int(1), Value::Int(1), Value::Int(1)],
                vec![Value::Int(1), Value::Int(2), Value::from("\\N")],
                vec![Value::Int(1), Value::Int(3), Value::Float(3.0)],
                vec![Value::Int(1), Value::Int(4), Value::Null],
                vec![Value::Int(1), Value::Int(5), Value::from(" 5")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_drops_missing_and_coerces() {
        let table = normalize_results(&results(), "position", "\\N").unwrap();
        let positions = table.column("position").unwrap().cloned().collect::<Vec<_>>();
        assert_eq!(positions, [Value::Int(1), Value::Int(3), Value::Int(5)]);
        assert!(
            table
                .column("position")
                .unwrap()
                .all(|v| matches!(v, Value::Int(_)))
        );
    }

    #[test]
    fn test_normalize_rejects_text() {
        let mut table = results();
        table
            .push_row(vec![Value::Int(1), Value::Int(6), Value::from("R")])
            .unwrap();
        assert!(matches!(
            normalize_results(&table, "position", "\\N"),
            Err(AnalysisError::NotInteger { row: 3, .. })
        ));
    }

    #[test]
    fn test_window_is_inclusive() {
        let races = Table::from_rows(
            ["raceId", "year"],
            vec![
                vec![Value::Int(1), Value::Int(2016)],
                vec![Value::Int(2), Value::Int(2015)],
                vec![Value::Int(3), Value::Null],
            ],
        )
        .unwrap();
        let recent = filter_recent_seasons(&races, 2026, 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent.get(0, "raceId").unwrap(), Some(&Value::Int(1)));
    }

    #[test]
    fn test_missing_year_column() {
        let table = results();
        assert!(filter_recent_seasons(&table, 2026, 10).is_err());
    }
}
