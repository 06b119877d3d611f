//! In-memory relational tables for the pitwall analysis tools.
//!
//! This crate provides a small, immutable-by-convention table model and the
//! relational operations the analysis pipeline needs:
//!
//! - **Values and tables** ([`Value`], [`Table`]): typed cells, named columns,
//!   projections, filters, derived columns and sorting
//! - **Joins** ([`join`]): left and inner joins on key columns with optional
//!   suffix disambiguation
//! - **Grouping** ([`group`]): group indices and per-group aggregation
//! - **Identifier detection** ([`identifier`]): pluggable predicates deciding
//!   which columns are keys
//! - **Merging** ([`merge`]): connects an arbitrary list of tables through
//!   shared identifier columns
//! - **CSV** ([`csv_io`]): loading and saving tables
//!
//! # Examples
//!
//! ```
//! use pitwall_frame::{SuffixIdentifier, csv_io, merge_tables};
//!
//! let pit_stops = csv_io::read_csv("raceId,driverId,stop,lap\n1,20,1,14\n".as_bytes())?;
//! let results = csv_io::read_csv("raceId,driverId,positionOrder\n1,20,3\n".as_bytes())?;
//!
//! let outcome = merge_tables(&[pit_stops, results], &SuffixIdentifier::default())?;
//! assert_eq!(outcome.table.columns(), ["raceId", "driverId", "stop", "lap", "positionOrder"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod csv_io;
pub mod group;
pub mod identifier;
pub mod join;
pub mod merge;
mod table;
mod value;

pub use self::{
    group::Aggregation,
    identifier::{IdentifierPredicate, PatternIdentifier, SuffixIdentifier, identifier_set},
    join::JoinKind,
    merge::{MergeError, MergeOutcome, merge_tables},
    table::{Table, TableError},
    value::Value,
};
