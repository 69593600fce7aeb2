//! Error types for mob-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mob-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backup copy could not be created, so the target was left untouched
    #[error("failed to create backup '{backup}' of '{path}': {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contained no non-blank lines
    #[error("file is empty: '{0}'")]
    EmptyFile(PathBuf),

    /// Names file requested for repair does not exist
    #[error("names file not found: '{0}'")]
    NamesFileMissing(PathBuf),

    /// Tab-delimited parsing error from the csv crate
    #[error("parse error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// An action needs a loaded table
    #[error("no table loaded")]
    NoTableLoaded,

    /// Cell address outside the table
    #[error("cell ({row}, {col}) is out of range")]
    CellOutOfRange { row: usize, col: usize },

    /// A mass-edit spec built from user input is malformed
    #[error("invalid mass edit: {0}")]
    InvalidEditSpec(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
