use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Args;
use pitwall_analysis::{config::AnalysisConfig, pipeline::FeaturePipeline};
use pitwall_frame::{
    IdentifierPredicate, MergeOutcome, PatternIdentifier, SuffixIdentifier, Table, csv_io,
    merge_tables,
};

pub const PIT_STOPS_CSV: &str = "pit_stops.csv";
pub const RESULTS_CSV: &str = "results.csv";
pub const STATUS_CSV: &str = "status.csv";
pub const LAP_TIMES_CSV: &str = "lap_times.csv";
pub const RACES_CSV: &str = "races.csv";

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn save_csv(table: &Table, output_path: Option<PathBuf>) -> anyhow::Result<()> {
        let mut output = Output::from_output_path(output_path)?;
        output.write_csv(table)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }

    pub fn write_csv(&mut self, table: &Table) -> anyhow::Result<()> {
        csv_io::write_csv(table, &mut *self)
            .with_context(|| format!("Failed to write CSV to {}", self.display_path()))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

pub fn read_table<P>(path: P) -> anyhow::Result<Table>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let table = csv_io::read_csv_path(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "loaded table"
    );
    Ok(table)
}

/// Identifier predicate from an optional `--id-pattern` regex.
pub fn identifier_predicate(pattern: Option<&str>) -> anyhow::Result<Box<dyn IdentifierPredicate>> {
    match pattern {
        Some(pattern) => {
            let predicate = PatternIdentifier::new(pattern)
                .with_context(|| format!("Invalid identifier pattern: {pattern}"))?;
            Ok(Box::new(predicate))
        }
        None => Ok(Box::new(SuffixIdentifier::default())),
    }
}

/// Location of the Ergast CSV dump.
#[derive(Debug, Clone, Args)]
pub(crate) struct DataArg {
    /// Directory containing pit_stops.csv, results.csv, status.csv, ...
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Regular expression for identifier column names (default: names ending in `Id`)
    #[arg(long)]
    pub id_pattern: Option<String>,
}

impl DataArg {
    pub fn read(&self, file_name: &str) -> anyhow::Result<Table> {
        read_table(self.data_dir.join(file_name))
    }

    /// Pit stops merged with results and status, with every enabled feature stage applied.
    pub fn load_enriched(&self, config: &AnalysisConfig) -> anyhow::Result<Table> {
        let file_names = [PIT_STOPS_CSV, RESULTS_CSV, STATUS_CSV];
        let tables = file_names
            .iter()
            .map(|name| self.read(name))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let predicate = identifier_predicate(self.id_pattern.as_deref())?;
        let outcome = merge_tables(&tables, &*predicate).context("Failed to merge tables")?;
        for message in self.unmerged_warnings(&file_names, &outcome) {
            eprintln!("{message}");
        }

        let table = FeaturePipeline::new(config.pipeline.clone())
            .run(&outcome.table)
            .context("Failed to derive features")?;
        eprintln!(
            "Derived features for {} pit stop records ({} before filtering)",
            table.len(),
            outcome.table.len()
        );
        Ok(table)
    }

    /// One line per input file the merge left out, naming the file.
    fn unmerged_warnings(&self, file_names: &[&str], outcome: &MergeOutcome) -> Vec<String> {
        outcome
            .unmerged
            .iter()
            .map(|&index| {
                format!(
                    "Warning: {} shares no identifier column with {}; its columns are missing",
                    self.data_dir.join(file_names[index]).display(),
                    file_names[0]
                )
            })
            .collect()
    }
}
