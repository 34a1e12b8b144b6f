//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading and parsing the dataset files.
///
/// Loading errors are fatal: the pipeline is a one-shot batch computation,
/// so nothing here is retried.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row in a data file couldn't be parsed into its record type,
    /// including CSV-level failures such as bad quoting
    #[error("Parse error at line {line} in {file}: {reason}")]
    Parse {
        file: String,
        line: u64,
        reason: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
