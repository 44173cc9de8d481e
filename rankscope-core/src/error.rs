use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read keyword source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Keyword source {} has no header row", path.display())]
    MissingHeader { path: PathBuf },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write report to {}: {source}", path.display())]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reason a single keyword row was rejected. Rejected rows are logged and
/// skipped; they never fail a load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("keyword is empty")]
    EmptyKeyword,

    #[error("{field} has negative value {value}")]
    NegativeValue { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
