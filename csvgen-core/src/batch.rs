//! Batch accumulation for write efficiency.
//!
//! Records are buffered until the batch threshold is reached, at which point
//! the full batch is handed back to the caller for writing. At end of stream
//! the caller drains whatever partial batch remains.
//!
//! ```
//! use csvgen_core::batch::BatchAccumulator;
//! # use csvgen_core::{Record, Schema};
//! # use std::sync::Arc;
//! # let schema = Arc::new(Schema::new(["id"]));
//! let mut accumulator = BatchAccumulator::new(2);
//! # let rec = |v: &str| Record::new(schema.clone(), vec![v.to_string()]).unwrap();
//! assert!(accumulator.push(rec("1")).is_none());
//! let full = accumulator.push(rec("2")).unwrap();
//! assert_eq!(full.len(), 2);
//! assert!(accumulator.finish().is_none());
//! ```

use tracing::trace;

use crate::record::Record;

/// Default number of records per batch
pub const DEFAULT_BATCH_THRESHOLD: usize = 10_000;

/// An ordered group of records flushed together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch in the stream, starting at 0
    sequence: u64,

    /// Records in arrival order
    records: Vec<Record>,
}

impl Batch {
    /// Create a batch from records
    pub fn new(sequence: u64, records: Vec<Record>) -> Self {
        Self { sequence, records }
    }

    /// Position of this batch in the stream
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Number of records in the batch
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in arrival order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Take ownership of the records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Buffers records and emits a [`Batch`] each time the threshold is reached.
///
/// The accumulator never holds more than `threshold` records, emits batches
/// in arrival order, and neither drops nor reorders records across a flush
/// boundary.
#[derive(Debug)]
pub struct BatchAccumulator {
    /// Records waiting to be flushed
    pending: Vec<Record>,

    /// Flush threshold in records
    threshold: usize,

    /// Sequence number of the next emitted batch
    next_sequence: u64,

    /// Total records accepted so far
    records_seen: u64,
}

impl BatchAccumulator {
    /// Create an accumulator that flushes every `threshold` records.
    ///
    /// A threshold of zero is treated as one.
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            pending: Vec::with_capacity(threshold.min(DEFAULT_BATCH_THRESHOLD)),
            threshold,
            next_sequence: 0,
            records_seen: 0,
        }
    }

    /// The flush threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Total records accepted
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    /// Number of batches emitted so far
    pub fn batches_emitted(&self) -> u64 {
        self.next_sequence
    }

    /// Add a record; returns the full batch when the threshold is reached
    pub fn push(&mut self, record: Record) -> Option<Batch> {
        self.pending.push(record);
        self.records_seen += 1;

        if self.pending.len() >= self.threshold {
            trace!(
                batch_records = self.pending.len(),
                sequence = self.next_sequence,
                "Threshold reached, flushing batch"
            );
            return Some(self.take_batch());
        }

        trace!(pending = self.pending.len(), "Record accumulated");
        None
    }

    /// Drain the partial batch at end of stream.
    ///
    /// Returns `None` when nothing is buffered; an empty flush is a no-op.
    pub fn finish(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            trace!("Nothing pending at end of stream");
            return None;
        }

        trace!(
            batch_records = self.pending.len(),
            sequence = self.next_sequence,
            "Flushing final batch"
        );
        Some(self.take_batch())
    }

    fn take_batch(&mut self) -> Batch {
        let capacity = self.threshold.min(DEFAULT_BATCH_THRESHOLD);
        let records = std::mem::replace(&mut self.pending, Vec::with_capacity(capacity));
        let batch = Batch::new(self.next_sequence, records);
        self.next_sequence += 1;
        batch
    }
}

impl Default for BatchAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn records(count: usize) -> impl Iterator<Item = Record> {
        let schema = Arc::new(Schema::new(["id"]));
        (0..count).map(move |i| Record::new(schema.clone(), vec![i.to_string()]).unwrap())
    }

    fn run(count: usize, threshold: usize) -> Vec<Batch> {
        let mut accumulator = BatchAccumulator::new(threshold);
        let mut batches: Vec<Batch> = records(count).filter_map(|r| accumulator.push(r)).collect();
        batches.extend(accumulator.finish());
        batches
    }

    #[test]
    fn test_flush_sizes_for_default_threshold() {
        let batches = run(25_000, DEFAULT_BATCH_THRESHOLD);
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![10_000, 10_000, 5_000]);
        let sequences: Vec<u64> = batches.iter().map(Batch::sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_flush() {
        let mut accumulator = BatchAccumulator::new(5);
        let flushed = records(10).filter_map(|r| accumulator.push(r)).count();
        assert_eq!(flushed, 2);
        assert!(accumulator.finish().is_none());
        assert_eq!(accumulator.batches_emitted(), 2);
    }

    #[test]
    fn test_empty_stream_is_a_noop() {
        let mut accumulator = BatchAccumulator::default();
        assert!(accumulator.finish().is_none());
        assert_eq!(accumulator.records_seen(), 0);
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        assert_eq!(BatchAccumulator::new(0).threshold(), 1);
    }

    proptest! {
        #[test]
        fn prop_batches_preserve_order_and_bound(count in 0usize..300, threshold in 1usize..50) {
            let batches = run(count, threshold);
            prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= threshold));

            let ids: Vec<String> = batches
                .into_iter()
                .flat_map(Batch::into_records)
                .map(|r| r.get("id").to_string())
                .collect();
            let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
            prop_assert_eq!(ids, expected);
        }
    }
}
