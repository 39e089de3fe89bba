//! Counters reported at the end of a pipeline run

use std::fmt;

use serde::Serialize;

use crate::config::Mode;

/// Statistics from one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Mode that produced this summary
    pub mode: Mode,

    /// Records read from the source
    pub rows_seen: u64,

    /// Records rejected by the row filter
    pub rows_skipped: u64,

    /// Records handed to the sink
    pub rows_written: u64,

    /// Batches handed to the sink
    pub batches_flushed: u64,
}

impl RunSummary {
    /// An empty summary for a mode
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            rows_seen: 0,
            rows_skipped: 0,
            rows_written: 0,
            batches_flushed: 0,
        }
    }

    /// Records the row filter kept
    pub fn rows_kept(&self) -> u64 {
        self.rows_seen.saturating_sub(self.rows_skipped)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mode:            {}", self.mode)?;
        writeln!(f, "  Rows seen:     {}", self.rows_seen)?;
        writeln!(f, "  Rows skipped:  {}", self.rows_skipped)?;
        writeln!(f, "  Rows kept:     {}", self.rows_kept())?;
        writeln!(f, "  Rows written:  {}", self.rows_written)?;
        write!(f, "  Batches:       {}", self.batches_flushed)
    }
}
