//! CSV reader implementation

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use csvgen_core::error::{Error as CoreError, Result as CoreResult};
use csvgen_core::{Record, RecordSource, Schema};
use tracing::debug;

use crate::error::{Error, Result};

/// Options for CSV reader
#[derive(Debug, Clone)]
pub struct CsvReaderOptions {
    /// Delimiter character
    pub delimiter: u8,

    /// Quote character
    pub quote: u8,

    /// Whether to trim whitespace around fields
    pub trim: bool,

    /// Buffer size for reading
    pub buffer_size: usize,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
            buffer_size: 64 * 1024, // 64KB
        }
    }
}

/// CSV reader that decodes a header row and then yields one record per line.
///
/// The header names the schema. A row whose field count differs from the
/// header, or that fails to decode, ends the stream with a source read error;
/// rows are never silently dropped.
#[derive(Debug)]
pub struct CsvRecordReader<R: Read> {
    /// Inner CSV reader
    reader: csv::Reader<R>,

    /// Schema taken from the header row
    schema: Arc<Schema>,

    /// Reused decode buffer
    record: StringRecord,

    /// Data rows decoded so far
    rows_read: u64,

    /// Whether the stream has ended (normally or with an error)
    exhausted: bool,

    /// Name used in error messages
    source_name: String,
}

impl<R: Read> CsvRecordReader<R> {
    /// Create a CSV reader, decoding the header row immediately
    pub fn new(reader: R, options: &CsvReaderOptions) -> Result<Self> {
        Self::with_name(reader, options, "<stream>")
    }

    /// Create a CSV reader with a name for error messages
    pub fn with_name(reader: R, options: &CsvReaderOptions, name: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(true)
            .flexible(false)
            .trim(if options.trim { Trim::All } else { Trim::None })
            .from_reader(reader);

        let header = reader.headers()?.clone();
        let schema = Arc::new(Schema::new(header.iter()));
        debug!(source = name, columns = %schema, "Read CSV header");

        Ok(Self {
            reader,
            schema,
            record: StringRecord::new(),
            rows_read: 0,
            exhausted: false,
            source_name: name.to_string(),
        })
    }

    fn read_next(&mut self) -> CoreResult<Option<Record>> {
        if self.exhausted {
            return Ok(None);
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                self.rows_read += 1;
                let values = self.record.iter().map(str::to_string).collect();
                Record::new(self.schema.clone(), values).map(Some)
            }
            Ok(false) => {
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => {
                self.exhausted = true;
                Err(CoreError::source_read(
                    Some(self.rows_read + 1),
                    format!("{}: {}", self.source_name, e),
                ))
            }
        }
    }
}

impl<R: Read> RecordSource for CsvRecordReader<R> {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next_record(&mut self) -> CoreResult<Option<Record>> {
        self.read_next()
    }
}

impl<R: Read> Iterator for CsvRecordReader<R> {
    type Item = CoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Open a CSV file as a record source
pub fn open_csv<P: AsRef<Path>>(
    path: P,
    options: &CsvReaderOptions,
) -> Result<CsvRecordReader<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::Core(CoreError::source_read(
            None,
            format!("cannot open {}: {}", path.display(), e),
        ))
    })?;

    let buf_reader = BufReader::with_capacity(options.buffer_size, file);
    CsvRecordReader::with_name(buf_reader, options, &path.display().to_string())
}
