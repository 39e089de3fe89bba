//! Pipeline orchestration for the four operating modes.
//!
//! Every mode is a straight line from a [`RecordSource`] to a [`RecordSink`]
//! (or to the log, for `process`). Records are pulled one at a time and
//! written a batch at a time; a batch is written before the source is read
//! any further, so read-ahead never exceeds one batch. A run only completes
//! once the source is drained and the final partial batch is flushed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::batch::{Batch, BatchAccumulator};
use crate::config::{Mode, PipelineConfig};
use crate::error::Result;
use crate::policy::{BackfillPolicy, RowDecision, RowFilter};
use crate::provider::FieldRegistry;
use crate::record::Record;
use crate::schema::Schema;
use crate::sink::RecordSink;
use crate::source::RecordSource;
use crate::summary::RunSummary;

/// Drives sources through column policies into sinks
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, validating its configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Schema produced by `add_columns` for a given input schema
    pub fn extended_schema(input: &Schema, columns: &[String]) -> Arc<Schema> {
        Arc::new(input.extended(columns))
    }

    /// Write every record of `source` to `sink` in batches
    pub fn generate<S, K>(&self, source: &mut S, sink: &mut K) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
    {
        let summary = self.drain(Mode::Generate, source, sink, |_, record| Ok(Some(record)))?;
        info!(rows = summary.rows_written, "Synthetic records written");
        Ok(summary)
    }

    /// Report the keep/skip decision of every row; nothing is written
    pub fn process<S, F>(&self, source: &mut S, filter: &F) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        F: RowFilter + ?Sized,
    {
        warn_missing_columns(filter, source.schema());

        let mut summary = RunSummary::new(Mode::Process);
        while let Some(record) = source.next_record()? {
            summary.rows_seen += 1;
            let row = summary.rows_seen;

            match filter.offending_column(&record) {
                Some(column) => {
                    summary.rows_skipped += 1;
                    info!(row, column, record = %record.to_json(), "Skipped row");
                }
                None => debug!(row, record = %record.to_json(), "Processed row"),
            }
        }

        info!(
            rows = summary.rows_seen,
            skipped = summary.rows_skipped,
            columns = %filter.checked_columns().join(", "),
            "Finished processing"
        );
        Ok(summary)
    }

    /// Copy the rows `filter` keeps from `source` to `sink`, unchanged
    pub fn filter_copy<S, F, K>(&self, source: &mut S, filter: &F, sink: &mut K) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        F: RowFilter + ?Sized,
        K: RecordSink + ?Sized,
    {
        warn_missing_columns(filter, source.schema());

        let summary = self.drain(Mode::GenerateFromExisting, source, sink, |row, record| {
            match filter.decide(&record) {
                RowDecision::Keep => Ok(Some(record)),
                RowDecision::Skip => {
                    debug!(row, "Excluded row");
                    Ok(None)
                }
            }
        })?;

        info!(
            kept = summary.rows_written,
            skipped = summary.rows_skipped,
            "Filtered copy written"
        );
        Ok(summary)
    }

    /// Append `columns` to every row of `source`, filling them per `fill`
    pub fn add_columns<S, K>(
        &self,
        source: &mut S,
        columns: &[String],
        fill: BackfillPolicy,
        registry: &mut FieldRegistry,
        sink: &mut K,
    ) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
    {
        let schema = Self::extended_schema(source.schema(), columns);
        info!(columns = %columns.join(", "), ?fill, "Adding columns");

        let summary = self.drain(Mode::AddColumns, source, sink, |_, record| {
            let extra = fill.values_for(columns, registry);
            record.extend(schema.clone(), extra).map(Some)
        })?;

        info!(rows = summary.rows_written, "Columns added");
        Ok(summary)
    }

    /// Pull every record through `stage` into batches for `sink`.
    ///
    /// `stage` receives the 1-based row number and returns `None` to drop the
    /// record.
    fn drain<S, K, T>(&self, mode: Mode, source: &mut S, sink: &mut K, mut stage: T) -> Result<RunSummary>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
        T: FnMut(u64, Record) -> Result<Option<Record>>,
    {
        let mut accumulator = BatchAccumulator::new(self.config.batch_threshold);
        let mut summary = RunSummary::new(mode);

        while let Some(record) = source.next_record()? {
            summary.rows_seen += 1;
            match stage(summary.rows_seen, record)? {
                Some(record) => {
                    if let Some(batch) = accumulator.push(record) {
                        write_batch(sink, batch, &mut summary)?;
                    }
                }
                None => summary.rows_skipped += 1,
            }
        }

        if let Some(batch) = accumulator.finish() {
            write_batch(sink, batch, &mut summary)?;
        }
        sink.finish()?;

        Ok(summary)
    }
}

fn write_batch<K: RecordSink + ?Sized>(sink: &mut K, batch: Batch, summary: &mut RunSummary) -> Result<()> {
    let records = batch.len() as u64;
    let sequence = batch.sequence();
    sink.write_batch(batch)?;

    summary.rows_written += records;
    summary.batches_flushed += 1;
    info!(sequence, records, "Batch written with {records} records");
    Ok(())
}

fn warn_missing_columns<F: RowFilter + ?Sized>(filter: &F, schema: &Schema) {
    let missing = filter.missing_columns(schema);
    if !missing.is_empty() {
        warn!(
            columns = %missing.join(", "),
            "Checked columns are not in the header; every row will be skipped"
        );
    }
}
