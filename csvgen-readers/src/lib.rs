//! CSV record source and sink implementations for csvgen
//!
//! This crate provides the file-backed side of the pipeline: a streaming
//! reader that turns a CSV file into records and a batched writer that turns
//! records back into a CSV file.

mod error;

pub mod csv;

pub use crate::csv::{
    create_csv_writer, create_replacing_writer, is_same_file, open_csv, CsvReaderOptions,
    CsvRecordReader, CsvRecordWriter, CsvWriterOptions, PendingReplace,
};
pub use error::{Error, Result};

// Re-export core types
pub use csvgen_core::{Batch, Record, RecordSink, RecordSource, Schema};
