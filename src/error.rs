//! Error type shared by the library.

use thiserror::Error;

/// Errors from building or running a relative position computation.
///
/// None of these are retried.
/// A computation either processes every partition or fails with the first error it encounters.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameters, detected before any computation starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure while opening, querying, or streaming a record source.
    #[error("Record source error: {0}")]
    RecordSource(String),

    /// A stored record breaks an invariant of the data model.
    #[error("Invalid record: {0}")]
    InvariantViolation(String),

    /// Failure while reading input files or writing reports.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Error::RecordSource(error.to_string())
    }
}
