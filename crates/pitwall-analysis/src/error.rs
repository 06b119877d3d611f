use pitwall_frame::{TableError, Value};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum AnalysisError {
    #[display("{source}")]
    Table { source: TableError },
    #[display("column '{column}' row {row}: expected an integer, found '{value}'")]
    #[from(ignore)]
    NotInteger {
        column: String,
        row: usize,
        value: Value,
    },
}
