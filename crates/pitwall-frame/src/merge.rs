//! Identifier-driven merging of many tables into one.
//!
//! # Algorithm
//!
//! Tables are nodes of a graph; two tables are adjacent when their identifier
//! sets overlap. Merging expands the connected component of the first table:
//!
//! ```text
//! acc      = tables[0]
//! frontier = ids(tables[0])
//! repeat:
//!     for each pending table t, in input order:
//!         key = frontier ∩ ids(t)
//!         if key is empty: keep t pending
//!         else:
//!             acc = acc ⟕ t on key     (suffix "_1"/"_2" on other shared columns)
//!             frontier = frontier ∪ ids(t)
//! until nothing is pending, or a whole pass merged nothing
//! ```
//!
//! The join key is the identifier overlap only. Shared columns that are not
//! identifiers (for example `time` in both `pit_stops.csv` and
//! `results.csv`) are kept from both sides under suffixed names.
//!
//! A pass without progress ends the loop. The tables still pending are
//! reported through [`MergeOutcome::unmerged`] and a `warn` event; the
//! partial result is returned as usual.

use std::collections::BTreeSet;

use crate::{
    IdentifierPredicate, Table, TableError,
    identifier::identifier_set,
    join::{DEFAULT_SUFFIXES, JoinKind},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum MergeError {
    #[display("no tables to merge")]
    NoTables,
    #[display("failed to join table #{index}: {source}")]
    Join { index: usize, source: TableError },
}

/// Result of [`merge_tables`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged table.
    pub table: Table,
    /// Union of the identifier sets of all merged tables.
    pub identifiers: BTreeSet<String>,
    /// Input indices in the order they were merged (starting with `0`).
    pub merged: Vec<usize>,
    /// Input indices that could not be connected.
    pub unmerged: Vec<usize>,
}

impl MergeOutcome {
    /// Whether every input table was merged.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.unmerged.is_empty()
    }
}

/// Left-joins every table reachable from `tables[0]` through shared identifiers.
///
/// # Examples
///
/// ```
/// use pitwall_frame::{SuffixIdentifier, Table, Value, merge_tables};
///
/// let pit_stops = Table::from_rows(
///     ["raceId", "driverId", "stop", "lap"],
///     vec![vec![Value::Int(1), Value::Int(20), Value::Int(1), Value::Int(14)]],
/// )?;
/// let results = Table::from_rows(
///     ["raceId", "driverId", "positionOrder", "statusId"],
///     vec![vec![Value::Int(1), Value::Int(20), Value::Int(3), Value::Int(1)]],
/// )?;
/// let status = Table::from_rows(
///     ["statusId", "status"],
///     vec![vec![Value::Int(1), Value::from("Finished")]],
/// )?;
///
/// let outcome = merge_tables(&[pit_stops, results, status], &SuffixIdentifier::default())?;
/// assert!(outcome.is_connected());
/// assert_eq!(outcome.table.get(0, "status")?, Some(&Value::from("Finished")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn merge_tables<P>(tables: &[Table], predicate: &P) -> Result<MergeOutcome, MergeError>
where
    P: IdentifierPredicate + ?Sized,
{
    let (first, _) = tables.split_first().ok_or(MergeError::NoTables)?;
    let ids = tables
        .iter()
        .map(|t| identifier_set(t, predicate))
        .collect::<Vec<_>>();

    let mut acc = first.clone();
    let mut frontier = ids[0].clone();
    let mut merged = vec![0];
    let mut pending = (1..tables.len()).collect::<Vec<_>>();

    while !pending.is_empty() {
        let mut still_pending = vec![];
        for &index in &pending {
            let key = frontier
                .intersection(&ids[index])
                .cloned()
                .collect::<BTreeSet<_>>();
            if key.is_empty() {
                still_pending.push(index);
                continue;
            }
            acc = join_step(&acc, &tables[index], &key)
                .map_err(|source| MergeError::Join { index, source })?;
            frontier.extend(ids[index].iter().cloned());
            merged.push(index);
            tracing::debug!(
                table = index,
                key = ?key,
                rows = acc.len(),
                columns = acc.columns().len(),
                "merged table"
            );
        }

        let progressed = still_pending.len() < pending.len();
        pending = still_pending;
        if !progressed {
            tracing::warn!(
                unmerged = ?pending,
                identifiers = ?frontier,
                "tables cannot be connected: no common identifier columns"
            );
            break;
        }
    }

    Ok(MergeOutcome {
        table: acc,
        identifiers: frontier,
        merged,
        unmerged: pending,
    })
}

fn join_step(acc: &Table, table: &Table, key: &BTreeSet<String>) -> Result<Table, TableError> {
    let common = acc
        .columns()
        .iter()
        .filter(|c| table.has_column(c))
        .cloned()
        .collect::<BTreeSet<_>>();
    let on = key.iter().collect::<Vec<_>>();
    let suffixes = (common != *key).then_some(DEFAULT_SUFFIXES);
    acc.join(table, &on, JoinKind::Left, suffixes)
}
