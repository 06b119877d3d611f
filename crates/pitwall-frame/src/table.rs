use std::collections::BTreeSet;

use crate::Value;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("missing column '{column}'")]
    MissingColumn { column: String },
    #[display("duplicate column '{column}'")]
    DuplicateColumn { column: String },
    #[display("row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("column '{column}' row {row}: expected a number, found '{value}'")]
    NotNumeric {
        column: String,
        row: usize,
        value: Value,
    },
}

/// An in-memory relation: named columns over rows of [`Value`]s.
///
/// Tables are treated as values. Every transformation borrows `self` and
/// returns a new table, so a table handed to an analysis function is never
/// changed by it. [`Table::push_row`] exists only for building a table.
///
/// # Examples
///
/// ```
/// use pitwall_frame::{Table, Value};
///
/// let table = Table::from_rows(
///     ["raceId", "lap"],
///     vec![
///         vec![Value::Int(1), Value::Int(12)],
///         vec![Value::Int(2), Value::Int(30)],
///     ],
/// )?;
/// let late = table.filter_column("lap", |v| v.as_i64().is_some_and(|lap| lap > 20))?;
/// assert_eq!(late.len(), 1);
/// assert_eq!(table.len(), 2);
/// # Ok::<(), pitwall_frame::TableError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(Self {
            columns,
            rows: vec![],
        })
    }

    /// Creates a table from columns and rows, checking every row's width.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::MissingColumn {
                column: name.to_owned(),
            })
    }

    pub fn column_indices<S>(&self, names: &[S]) -> Result<Vec<usize>, TableError>
    where
        S: AsRef<str>,
    {
        names
            .iter()
            .map(|name| self.column_index(name.as_ref()))
            .collect()
    }

    /// Iterates over the values of one column.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_, TableError> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[index]))
    }

    /// Collects a column as `f64`, mapping missing values to `NaN`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, TableError> {
        let index = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, values)| match &values[index] {
                Value::Null => Ok(f64::NAN),
                Value::Str(_) => Err(TableError::NotNumeric {
                    column: name.to_owned(),
                    row,
                    value: values[index].clone(),
                }),
                value => Ok(value.as_f64().unwrap_or(f64::NAN)),
            })
            .collect()
    }

    pub fn get(&self, row: usize, column: &str) -> Result<Option<&Value>, TableError> {
        let index = self.column_index(column)?;
        Ok(self.rows.get(row).map(|r| &r[index]))
    }

    /// Projects the table onto the given columns, in the given order.
    pub fn select<S>(&self, names: &[S]) -> Result<Self, TableError>
    where
        S: AsRef<str>,
    {
        let indices = self.column_indices(names)?;
        let mut table = Self::new(names.iter().map(|n| n.as_ref().to_owned()))?;
        table.rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(table)
    }

    /// Keeps the rows for which `predicate` returns `true`.
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| predicate(row))
                .cloned()
                .collect(),
        }
    }

    /// Keeps the rows whose value in `column` satisfies `predicate`.
    pub fn filter_column<F>(&self, column: &str, mut predicate: F) -> Result<Self, TableError>
    where
        F: FnMut(&Value) -> bool,
    {
        let index = self.column_index(column)?;
        Ok(self.filter(|row| predicate(&row[index])))
    }

    /// Appends a column computed from each row.
    pub fn with_column<F>(&self, name: &str, mut compute: F) -> Result<Self, TableError>
    where
        F: FnMut(&[Value]) -> Value,
    {
        if self.has_column(name) {
            return Err(TableError::DuplicateColumn {
                column: name.to_owned(),
            });
        }
        let mut columns = self.columns.clone();
        columns.push(name.to_owned());
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let value = compute(row);
                let mut row = row.clone();
                row.push(value);
                row
            })
            .collect();
        Ok(Self { columns, rows })
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<Self, TableError> {
        let index = self.column_index(from)?;
        if from != to && self.has_column(to) {
            return Err(TableError::DuplicateColumn {
                column: to.to_owned(),
            });
        }
        let mut table = self.clone();
        to.clone_into(&mut table.columns[index]);
        Ok(table)
    }

    /// Stable sort by the given key columns, ascending.
    pub fn sort_by_columns<S>(&self, names: &[S]) -> Result<Self, TableError>
    where
        S: AsRef<str>,
    {
        let indices = self.column_indices(names)?;
        let mut table = self.clone();
        table.rows.sort_by(|a, b| {
            indices
                .iter()
                .map(|&i| a[i].cmp(&b[i]))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(table)
    }

    /// Removes duplicate rows, keeping the first occurrence of each.
    #[must_use]
    pub fn distinct(&self) -> Self {
        let mut seen = BTreeSet::new();
        self.filter(|row| seen.insert(row.to_vec()))
    }
}
