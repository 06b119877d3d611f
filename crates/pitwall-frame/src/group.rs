//! Group-by helpers.
//!
//! Groups are keyed by the tuple of key-column values and iterate in key
//! order, so aggregated tables come out sorted by their keys.

use std::collections::BTreeMap;

use crate::{Table, TableError, Value};

/// Aggregation applied to one column within each group.
///
/// All aggregations skip missing values. A group with no usable values
/// yields `Null`, except [`Aggregation::Count`] which yields `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Number of non-missing values.
    Count,
    /// Largest value.
    Max,
    /// Smallest value.
    Min,
    /// Arithmetic mean of the numeric values.
    Mean,
}

impl Aggregation {
    #[expect(clippy::cast_precision_loss)]
    fn apply<'a, I>(self, values: I) -> Value
    where
        I: Iterator<Item = &'a Value>,
    {
        let present = values.filter(|v| !v.is_missing());
        match self {
            Aggregation::Count => Value::Int(i64::try_from(present.count()).unwrap_or(i64::MAX)),
            Aggregation::Max => present.max().cloned().unwrap_or_default(),
            Aggregation::Min => present.min().cloned().unwrap_or_default(),
            Aggregation::Mean => {
                let (sum, n) = present
                    .filter_map(Value::as_f64)
                    .fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
                if n == 0 {
                    Value::Null
                } else {
                    Value::Float(sum / n as f64)
                }
            }
        }
    }
}

impl Table {
    /// Row indices of each group, keyed by the values of `keys`.
    pub fn group_indices<S>(&self, keys: &[S]) -> Result<BTreeMap<Vec<Value>, Vec<usize>>, TableError>
    where
        S: AsRef<str>,
    {
        let key_indices = self.column_indices(keys)?;
        let mut groups = BTreeMap::<_, Vec<_>>::new();
        for (i, row) in self.rows().iter().enumerate() {
            let key = key_indices.iter().map(|&k| row[k].clone()).collect();
            groups.entry(key).or_default().push(i);
        }
        Ok(groups)
    }

    /// Groups by `keys` and aggregates `column` into a new column `output`.
    ///
    /// The result has the key columns followed by `output`, one row per
    /// group, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitwall_frame::{Aggregation, Table, Value};
    ///
    /// let stops = Table::from_rows(
    ///     ["raceId", "driverId", "stop"],
    ///     vec![
    ///         vec![Value::Int(1), Value::Int(4), Value::Int(1)],
    ///         vec![Value::Int(1), Value::Int(4), Value::Int(2)],
    ///         vec![Value::Int(1), Value::Int(3), Value::Int(1)],
    ///     ],
    /// )?;
    /// let totals = stops.aggregate(&["raceId", "driverId"], "stop", Aggregation::Max, "total_stops")?;
    /// assert_eq!(totals.columns(), ["raceId", "driverId", "total_stops"]);
    /// assert_eq!(totals.rows()[0], vec![Value::Int(1), Value::Int(3), Value::Int(1)]);
    /// assert_eq!(totals.rows()[1], vec![Value::Int(1), Value::Int(4), Value::Int(2)]);
    /// # Ok::<(), pitwall_frame::TableError>(())
    /// ```
    pub fn aggregate<S>(
        &self,
        keys: &[S],
        column: &str,
        aggregation: Aggregation,
        output: &str,
    ) -> Result<Table, TableError>
    where
        S: AsRef<str>,
    {
        let value_index = self.column_index(column)?;
        let groups = self.group_indices(keys)?;
        let columns = keys
            .iter()
            .map(|k| k.as_ref().to_owned())
            .chain([output.to_owned()]);
        let mut table = Table::new(columns)?;
        for (mut key, rows) in groups {
            let value = aggregation.apply(rows.iter().map(|&r| &self.rows()[r][value_index]));
            key.push(value);
            table.push_row(key)?;
        }
        Ok(table)
    }
}
