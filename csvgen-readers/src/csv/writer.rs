//! CSV writer implementation

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::WriterBuilder;
use csvgen_core::error::{Error as CoreError, Result as CoreResult};
use csvgen_core::{Batch, RecordSink, Schema};
use tempfile::{NamedTempFile, TempPath};
use tracing::debug;

use crate::error::{Error, Result};

/// Options for CSV writer
#[derive(Debug, Clone)]
pub struct CsvWriterOptions {
    /// Delimiter character
    pub delimiter: u8,

    /// Quote character
    pub quote: u8,

    /// Whether to quote all fields
    pub quote_all: bool,

    /// Buffer size for writing
    pub buffer_size: usize,
}

impl Default for CsvWriterOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            quote_all: false,
            buffer_size: 64 * 1024, // 64KB
        }
    }
}

/// CSV writer that emits the header on creation and one line per record.
///
/// Every record must conform to the writer's schema; each batch is flushed
/// to the underlying writer once written.
pub struct CsvRecordWriter<W: Write> {
    /// Inner CSV writer
    writer: csv::Writer<W>,

    /// Schema of the output
    schema: Arc<Schema>,

    /// Data rows written so far
    rows_written: u64,

    /// Name used in error messages
    destination: String,
}

impl<W: Write> CsvRecordWriter<W> {
    /// Create a new CSV writer and write the header row
    pub fn new(writer: W, schema: Arc<Schema>, options: &CsvWriterOptions) -> Result<Self> {
        Self::with_name(writer, schema, options, "<stream>")
    }

    /// Create a new CSV writer with a name for error messages
    pub fn with_name(
        writer: W,
        schema: Arc<Schema>,
        options: &CsvWriterOptions,
        name: &str,
    ) -> Result<Self> {
        let mut csv_writer = WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .quote_style(if options.quote_all {
                csv::QuoteStyle::Always
            } else {
                csv::QuoteStyle::Necessary
            })
            .from_writer(writer);

        if !schema.is_empty() {
            csv_writer.write_record(schema.fields())?;
        }
        debug!(destination = name, columns = %schema, "Wrote CSV header");

        Ok(Self {
            writer: csv_writer,
            schema,
            rows_written: 0,
            destination: name.to_string(),
        })
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Write every record of a batch, then flush
    pub fn write_records(&mut self, batch: &Batch) -> Result<()> {
        for record in batch.records() {
            if !record.conforms_to(&self.schema) {
                return Err(Error::Core(CoreError::SchemaMismatch(format!(
                    "record with fields [{}] written to [{}]",
                    record.schema(),
                    self.schema
                ))));
            }
            self.writer.write_record(record.values())?;
            self.rows_written += 1;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flush the writer
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn sink_error(&self, err: &Error) -> CoreError {
        match err {
            Error::Core(CoreError::SchemaMismatch(message)) => {
                CoreError::SchemaMismatch(message.clone())
            }
            other => CoreError::SinkWrite(format!("{}: {}", self.destination, other)),
        }
    }
}

impl<W: Write> RecordSink for CsvRecordWriter<W> {
    fn write_batch(&mut self, batch: Batch) -> CoreResult<()> {
        self.write_records(&batch).map_err(|e| self.sink_error(&e))
    }

    fn finish(&mut self) -> CoreResult<()> {
        self.flush().map_err(|e| self.sink_error(&e))
    }
}

/// Create a CSV writer for a file
pub fn create_csv_writer<P: AsRef<Path>>(
    path: P,
    schema: Arc<Schema>,
    options: &CsvWriterOptions,
) -> Result<CsvRecordWriter<BufWriter<File>>> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::Core(CoreError::SinkWrite(format!(
            "cannot create {}: {}",
            path.display(),
            e
        )))
    })?;
    let buf_writer = BufWriter::with_capacity(options.buffer_size, file);

    CsvRecordWriter::with_name(buf_writer, schema, options, &path.display().to_string())
}

/// A finished temporary file waiting to replace its target
#[derive(Debug)]
pub struct PendingReplace {
    temp: TempPath,
    target: PathBuf,
}

impl PendingReplace {
    /// Atomically move the temporary file over the target.
    ///
    /// Dropping a `PendingReplace` without committing removes the temporary
    /// file and leaves the target untouched.
    pub fn commit(self) -> Result<()> {
        self.temp
            .persist(&self.target)
            .map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

/// Whether two paths name the same file.
///
/// Symlinks and `..` components are resolved first. A path that does not
/// exist yet is resolved through its parent directory.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    resolve(a) == resolve(b)
}

fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Create a CSV writer whose output replaces `path` once committed.
///
/// Output goes to a temporary file in the same directory as `path`.
pub fn create_replacing_writer<P: AsRef<Path>>(
    path: P,
    schema: Arc<Schema>,
    options: &CsvWriterOptions,
) -> Result<(CsvRecordWriter<BufWriter<File>>, PendingReplace)> {
    let target = path.as_ref().to_path_buf();
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let temp = NamedTempFile::new_in(dir)?;
    let file = temp.as_file().try_clone()?;
    let buf_writer = BufWriter::with_capacity(options.buffer_size, file);
    let writer =
        CsvRecordWriter::with_name(buf_writer, schema, options, &target.display().to_string())?;

    Ok((
        writer,
        PendingReplace {
            temp: temp.into_temp_path(),
            target,
        },
    ))
}
