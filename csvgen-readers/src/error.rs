//! Error types for the CSV codec

use thiserror::Error;

/// Error type for CSV readers and writers
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] csvgen_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV format error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for CSV readers and writers
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for csvgen_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            Error::Io(inner) => csvgen_core::Error::Io(inner),
            other => csvgen_core::Error::source_read(None, other.to_string()),
        }
    }
}
