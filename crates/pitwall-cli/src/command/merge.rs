use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pitwall_frame::merge_tables;

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct MergeArg {
    /// CSV files to merge; the first one seeds the result
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Regular expression for identifier column names (default: names ending in `Id`)
    #[arg(long)]
    pub id_pattern: Option<String>,

    /// Output CSV file (default: stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &MergeArg) -> anyhow::Result<()> {
    let tables = arg
        .files
        .iter()
        .map(util::read_table)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let predicate = util::identifier_predicate(arg.id_pattern.as_deref())?;
    let outcome = merge_tables(&tables, &*predicate).context("Failed to merge tables")?;

    eprintln!(
        "Merged {} of {} tables: {} rows, {} columns",
        outcome.merged.len(),
        tables.len(),
        outcome.table.len(),
        outcome.table.columns().len()
    );
    eprintln!(
        "Identifier columns: {}",
        outcome
            .identifiers
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    for &index in &outcome.unmerged {
        eprintln!(
            "Warning: {} shares no identifier column with the merged tables",
            arg.files[index].display()
        );
    }

    Output::save_csv(&outcome.table, arg.output.clone())
}
