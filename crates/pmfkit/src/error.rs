//! Error types for the pmfkit library.

use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::{RunKind, TableKind};
use crate::table::Axis;

/// Main error type for pmfkit operations.
#[derive(Debug, Error)]
pub enum PmfError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cell could not be interpreted.
    #[error("Parse error in '{table}' at row {row}, column {column}: {message}")]
    Parse {
        table: String,
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to ingest.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Saving or loading a dataset failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The base profile table cannot produce run metadata.
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// A table references a label absent from the run metadata.
    #[error("Unknown {axis} label '{label}' in table '{table}'")]
    UnknownLabel {
        label: String,
        axis: Axis,
        table: String,
    },

    /// The same label appears twice on one axis.
    #[error("Duplicate {axis} label '{label}' in table '{table}'")]
    DuplicateLabel {
        label: String,
        axis: Axis,
        table: String,
    },

    /// The requested run lacks tables required by a computation.
    #[error("Run '{run}' has no {table} table")]
    MissingRun { run: RunKind, table: TableKind },

    /// A ratio would divide by a zero reference value.
    #[error("Degenerate profile in {run} run: {reason}")]
    DegenerateProfile { run: RunKind, reason: String },

    /// Caller asked for a factor outside the vocabulary.
    #[error("Unknown factor '{0}'")]
    UnknownFactor(String),

    /// Caller asked for a species outside the vocabulary.
    #[error("Unknown species '{0}'")]
    UnknownSpecies(String),

    /// A reference factor has no bootstrap mapping row.
    #[error("Bootstrap mapping for {run} run has no row for factor '{factor}'")]
    IncompleteMapping { run: RunKind, factor: String },
}

impl PmfError {
    pub(crate) fn parse(
        table: impl Into<String>,
        row: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        PmfError::Parse {
            table: table.into(),
            row,
            column,
            message: message.into(),
        }
    }
}

/// Result type alias for pmfkit operations.
pub type Result<T> = std::result::Result<T, PmfError>;
