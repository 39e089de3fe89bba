//! Line-delimited CSV codec
//!
//! This module provides a streaming CSV record source that names its schema
//! from the header row, and a batched CSV sink that writes the header up
//! front and flushes after every batch.

mod reader;
mod writer;

pub use reader::{open_csv, CsvReaderOptions, CsvRecordReader};
pub use writer::{
    create_csv_writer, create_replacing_writer, is_same_file, CsvRecordWriter, CsvWriterOptions,
    PendingReplace,
};
