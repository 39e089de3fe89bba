//! Core data model, column policies and batch pipeline for csvgen
//!
//! This crate holds everything that does not touch the file system: the
//! schema and record types, the fake-field provider, the column policies that
//! decide which fields are populated and which rows are kept, the batch
//! accumulator, and the pipeline that drives a record source into a sink.

#![warn(missing_docs)]

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod provider;
pub mod record;
pub mod schema;
pub mod sink;
pub mod source;
pub mod summary;

// Re-export key types for convenience
pub use batch::{Batch, BatchAccumulator, DEFAULT_BATCH_THRESHOLD};
pub use config::{Mode, PipelineConfig, RunConfig};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use policy::{
    BackfillPolicy, ColumnFilter, EmptinessFilter, GatedFilter, GenerationPolicy, RowDecision,
    RowFilter,
};
pub use provider::{FieldRegistry, ValueGenerator};
pub use record::Record;
pub use schema::Schema;
pub use sink::RecordSink;
pub use source::{RecordSource, SyntheticSource};
pub use summary::RunSummary;
