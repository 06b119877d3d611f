//! Identifier-column detection.
//!
//! The merger connects tables through columns that *look like* keys. What
//! "looks like a key" is a naming convention, so it is expressed as a
//! predicate the caller supplies:
//!
//! - [`SuffixIdentifier`] (the default): a word-character prefix followed by
//!   a fixed suffix, `Id` unless configured otherwise (`raceId`, `driverId`)
//! - [`PatternIdentifier`]: a full match against a regular expression
//! - any `Fn(&str) -> bool` closure

use std::collections::BTreeSet;

use regex::Regex;

use crate::Table;

/// Decides whether a column name denotes an identifier.
pub trait IdentifierPredicate {
    fn is_identifier(&self, column: &str) -> bool;
}

impl<F> IdentifierPredicate for F
where
    F: Fn(&str) -> bool,
{
    fn is_identifier(&self, column: &str) -> bool {
        self(column)
    }
}

/// Matches `<word characters><suffix>`, case-sensitive.
///
/// # Examples
///
/// ```
/// use pitwall_frame::{IdentifierPredicate, SuffixIdentifier};
///
/// let ids = SuffixIdentifier::default();
/// assert!(ids.is_identifier("raceId"));
/// assert!(ids.is_identifier("constructor_Id"));
/// assert!(!ids.is_identifier("raceid"));
/// assert!(!ids.is_identifier("race-Id"));
/// assert!(!ids.is_identifier("positionOrder"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixIdentifier {
    suffix: String,
}

impl SuffixIdentifier {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for SuffixIdentifier {
    fn default() -> Self {
        Self::new("Id")
    }
}

impl IdentifierPredicate for SuffixIdentifier {
    fn is_identifier(&self, column: &str) -> bool {
        column.strip_suffix(&self.suffix).is_some_and(|prefix| {
            prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
    }
}

/// Matches column names against a regular expression, anchored at both ends.
#[derive(Debug, Clone)]
pub struct PatternIdentifier {
    regex: Regex,
}

impl PatternIdentifier {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { regex })
    }
}

impl IdentifierPredicate for PatternIdentifier {
    fn is_identifier(&self, column: &str) -> bool {
        self.regex.is_match(column)
    }
}

/// The identifier-like column names of `table`.
pub fn identifier_set<P>(table: &Table, predicate: &P) -> BTreeSet<String>
where
    P: IdentifierPredicate + ?Sized,
{
    table
        .columns()
        .iter()
        .filter(|c| predicate.is_identifier(c))
        .cloned()
        .collect()
}
