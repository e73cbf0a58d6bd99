//! Error types for the datasieve library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for datasieve operations.
///
/// Only table-level failures are errors. Data-quality problems found in
/// individual cells are recorded as findings and never surface here.
#[derive(Debug, Error)]
pub enum SieveError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a spreadsheet workbook.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Error writing the annotated workbook.
    #[error("Workbook write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no columns to scan.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SieveError {
    /// Wrap an IO error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SieveError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for datasieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
