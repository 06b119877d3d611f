//! Key-based joins between tables.
//!
//! Joins match rows on equal key tuples (see [`Value`] for equality across
//! integer and float cells). Rows whose key contains a missing value (`Null`
//! or `NaN`) never match, not even each other; pandas `merge` instead pairs
//! `NaN` keys with each other.
//!
//! Output column order is: all left columns, then the right columns that are
//! not join keys. Output row order follows the left table, and for each left
//! row the matching right rows follow right-table order.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Table, TableError, Value};

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Keep every left row; unmatched right columns are `Null`.
    Left,
    /// Keep only left rows with at least one match.
    Inner,
}

/// Suffixes appended to overlapping non-key columns, `(left, right)`.
pub type Suffixes<'a> = (&'a str, &'a str);

/// Suffixes used when merging tables with overlapping non-key columns.
pub const DEFAULT_SUFFIXES: Suffixes<'static> = ("_1", "_2");

impl Table {
    /// Left outer join on `on`, failing if a non-key column name collides.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitwall_frame::{Table, Value};
    ///
    /// let a = Table::from_rows(
    ///     ["X", "a"],
    ///     vec![vec![Value::Int(1), Value::Int(3)], vec![Value::Int(2), Value::Int(4)]],
    /// )?;
    /// let b = Table::from_rows(
    ///     ["X", "b"],
    ///     vec![vec![Value::Int(3), Value::Int(8)], vec![Value::Int(2), Value::Int(9)]],
    /// )?;
    /// let joined = a.left_join(&b, &["X"])?;
    /// assert_eq!(joined.columns(), ["X", "a", "b"]);
    /// assert_eq!(joined.get(0, "b")?, Some(&Value::Null));
    /// assert_eq!(joined.get(1, "b")?, Some(&Value::Int(9)));
    /// # Ok::<(), pitwall_frame::TableError>(())
    /// ```
    pub fn left_join<S>(&self, right: &Table, on: &[S]) -> Result<Table, TableError>
    where
        S: AsRef<str>,
    {
        self.join(right, on, JoinKind::Left, None)
    }

    /// Inner join on `on`, failing if a non-key column name collides.
    pub fn inner_join<S>(&self, right: &Table, on: &[S]) -> Result<Table, TableError>
    where
        S: AsRef<str>,
    {
        self.join(right, on, JoinKind::Inner, None)
    }

    /// General join.
    ///
    /// With `suffixes`, non-key columns present on both sides are renamed to
    /// `<name><left suffix>` and `<name><right suffix>`. Without them such a
    /// collision is a [`TableError::DuplicateColumn`].
    pub fn join<S>(
        &self,
        right: &Table,
        on: &[S],
        kind: JoinKind,
        suffixes: Option<Suffixes<'_>>,
    ) -> Result<Table, TableError>
    where
        S: AsRef<str>,
    {
        let left_keys = self.column_indices(on)?;
        let right_keys = right.column_indices(on)?;
        let key_names = on.iter().map(AsRef::as_ref).collect::<BTreeSet<&str>>();

        let right_payload = right
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| !key_names.contains(name.as_str()))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let overlap = right_payload
            .iter()
            .map(|&i| right.columns()[i].as_str())
            .filter(|name| self.has_column(name))
            .collect::<BTreeSet<&str>>();

        let rename = |name: &str, left: bool| -> Result<String, TableError> {
            if !overlap.contains(name) {
                return Ok(name.to_owned());
            }
            match suffixes {
                Some((l, r)) => Ok(format!("{name}{}", if left { l } else { r })),
                None => Err(TableError::DuplicateColumn {
                    column: name.to_owned(),
                }),
            }
        };

        let mut columns = self
            .columns()
            .iter()
            .map(|name| rename(name, true))
            .collect::<Result<Vec<_>, _>>()?;
        for &i in &right_payload {
            columns.push(rename(&right.columns()[i], false)?);
        }
        let mut output = Table::new(columns)?;

        let index = key_index(right, &right_keys);
        for left_row in self.rows() {
            let key = extract_key(left_row, &left_keys);
            let matches = key.as_ref().and_then(|key| index.get(key));
            match matches {
                Some(matches) => {
                    for &r in matches {
                        let mut row = left_row.clone();
                        row.extend(right_payload.iter().map(|&i| right.rows()[r][i].clone()));
                        output.push_row(row)?;
                    }
                }
                None if kind == JoinKind::Left => {
                    let mut row = left_row.clone();
                    row.resize(left_row.len() + right_payload.len(), Value::Null);
                    output.push_row(row)?;
                }
                None => {}
            }
        }

        Ok(output)
    }
}

fn extract_key(row: &[Value], keys: &[usize]) -> Option<Vec<Value>> {
    keys.iter()
        .map(|&i| (!row[i].is_missing()).then(|| row[i].clone()))
        .collect()
}

fn key_index(table: &Table, keys: &[usize]) -> BTreeMap<Vec<Value>, Vec<usize>> {
    let mut index = BTreeMap::<_, Vec<_>>::new();
    for (i, row) in table.rows().iter().enumerate() {
        if let Some(key) = extract_key(row, keys) {
            index.entry(key).or_default().push(i);
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[&[i64]]) -> Vec<Vec<Value>> {
        values
            .iter()
            .map(|row| row.iter().map(|&v| Value::Int(v)).collect())
            .collect()
    }

    #[test]
    fn test_left_join_fills_null() {
        let a = Table::from_rows(["X", "a"], ints(&[&[1, 3], &[2, 4]])).unwrap();
        let b = Table::from_rows(["X", "b"], ints(&[&[3, 8], &[2, 9]])).unwrap();
        let joined = a.left_join(&b, &["X"]).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.rows()[0], vec![Value::Int(1), Value::Int(3), Value::Null]);
        assert_eq!(joined.rows()[1], vec![Value::Int(2), Value::Int(4), Value::Int(9)]);
    }

    #[test]
    fn test_inner_join_drops_unmatched() {
        let a = Table::from_rows(["X", "a"], ints(&[&[1, 3], &[2, 4]])).unwrap();
        let b = Table::from_rows(["X", "b"], ints(&[&[3, 8], &[2, 9]])).unwrap();
        let joined = a.inner_join(&b, &["X"]).unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.get(0, "a").unwrap(), Some(&Value::Int(4)));
    }

    #[test]
    fn test_row_multiplication_keeps_left_order() {
        let a = Table::from_rows(["X"], ints(&[&[1], &[2]])).unwrap();
        let b = Table::from_rows(["X", "b"], ints(&[&[2, 1], &[1, 5], &[2, 2]])).unwrap();
        let joined = a.left_join(&b, &["X"]).unwrap();
        let b_values = joined.column("b").unwrap().cloned().collect::<Vec<_>>();
        assert_eq!(b_values, vec![Value::Int(5), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_collision_requires_suffixes() {
        let a = Table::from_rows(["X", "v"], ints(&[&[1, 3]])).unwrap();
        let b = Table::from_rows(["X", "v"], ints(&[&[1, 4]])).unwrap();
        assert!(matches!(
            a.left_join(&b, &["X"]),
            Err(TableError::DuplicateColumn { .. })
        ));

        let joined = a
            .join(&b, &["X"], JoinKind::Left, Some(DEFAULT_SUFFIXES))
            .unwrap();
        assert_eq!(joined.columns(), ["X", "v_1", "v_2"]);
        assert_eq!(joined.rows()[0], vec![Value::Int(1), Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_null_keys_never_match() {
        let a = Table::from_rows(["X", "a"], vec![vec![Value::Null, Value::Int(1)]]).unwrap();
        let b = Table::from_rows(["X", "b"], vec![vec![Value::Null, Value::Int(2)]]).unwrap();
        let joined = a.left_join(&b, &["X"]).unwrap();
        assert_eq!(joined.get(0, "b").unwrap(), Some(&Value::Null));
    }

    #[test]
    fn test_nan_keys_never_match() {
        let a = Table::from_rows(["X", "a"], vec![vec![Value::Float(f64::NAN), Value::Int(1)]])
            .unwrap();
        let b = Table::from_rows(["X", "b"], vec![vec![Value::Float(f64::NAN), Value::Int(2)]])
            .unwrap();
        assert!(a.inner_join(&b, &["X"]).unwrap().is_empty());
        let joined = a.left_join(&b, &["X"]).unwrap();
        assert_eq!(joined.get(0, "b").unwrap(), Some(&Value::Null));
    }

    #[test]
    fn test_int_and_float_keys_match() {
        let a = Table::from_rows(["X"], vec![vec![Value::Int(2)]]).unwrap();
        let b = Table::from_rows(["X", "b"], vec![vec![Value::Float(2.0), Value::Int(7)]]).unwrap();
        let joined = a.inner_join(&b, &["X"]).unwrap();
        assert_eq!(joined.len(), 1);
    }
}
