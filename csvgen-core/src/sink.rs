//! Sink trait and implementations for batched record output

use crate::batch::Batch;
use crate::error::Result;

/// A destination that consumes finalized batches.
///
/// Ownership of each batch transfers to the sink. Batches arrive in the order
/// they were filled; a failed write is not retried and earlier batches are not
/// undone.
#[cfg_attr(test, mockall::automock)]
pub trait RecordSink {
    /// Consume one batch
    fn write_batch(&mut self, batch: Batch) -> Result<()>;

    /// Flush any buffered output and finalize
    fn finish(&mut self) -> Result<()>;
}

impl<K: RecordSink + ?Sized> RecordSink for Box<K> {
    fn write_batch(&mut self, batch: Batch) -> Result<()> {
        (**self).write_batch(batch)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// A sink that collects batches in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// The collected batches
    batches: Vec<Batch>,

    /// Whether `finish` was called
    finished: bool,
}

#[cfg(test)]
impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the collected batches
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Sizes of the collected batches, in arrival order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(Batch::len).collect()
    }

    /// Total number of collected records
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// Whether the sink was finalized
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take ownership of the collected batches
    pub fn take_batches(self) -> Vec<Batch> {
        self.batches
    }
}

#[cfg(test)]
impl RecordSink for CollectingSink {
    fn write_batch(&mut self, batch: Batch) -> Result<()> {
        self.batches.push(batch);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
