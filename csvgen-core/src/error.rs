//! Error types for csvgen pipelines

use std::io;
use thiserror::Error;

/// Result type for csvgen pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for csvgen pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration, detected before any source is opened
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The record source could not be opened or a row failed to decode
    #[error("Source read error{}: {message}", row.map(|r| format!(" at row {r}")).unwrap_or_default())]
    SourceRead {
        /// 1-based data row at which the failure occurred, if known
        row: Option<u64>,
        /// Description of the failure
        message: String,
    },

    /// Writing a batch to the destination failed
    #[error("Sink write error: {0}")]
    SinkWrite(String),

    /// A record does not conform to the active schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Shorthand for a source read error at a known row
    pub fn source_read(row: Option<u64>, message: impl Into<String>) -> Self {
        Error::SourceRead {
            row,
            message: message.into(),
        }
    }

    /// Whether this error was raised before any I/O took place
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
