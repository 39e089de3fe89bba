//! Column policies: how synthetic records are populated and which existing
//! rows are kept.
//!
//! The three emptiness behaviors are separate types:
//!
//! - [`GenerationPolicy::RecordToggle`] blanks or fills a whole synthetic
//!   record on a coin flip.
//! - [`EmptinessFilter`] skips a row when any checked column is empty.
//! - [`GatedFilter`] checks a gate column first and only then the rest.
//!
//! Filter decisions are pure functions of the record and the checked
//! columns. A column the record does not have counts as empty.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::provider::FieldRegistry;
use crate::record::Record;
use crate::schema::Schema;

/// Policy used by a synthetic source to fill each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPolicy {
    /// Every field is populated from the fake-field provider
    #[default]
    AlwaysPopulate,

    /// An unbiased coin decides per record: populate every field, or leave
    /// every field empty
    RecordToggle,
}

impl GenerationPolicy {
    /// Build one record over `schema` according to this policy
    pub fn build_record(self, schema: &Arc<Schema>, registry: &mut FieldRegistry) -> Result<Record> {
        let populate = match self {
            GenerationPolicy::AlwaysPopulate => true,
            GenerationPolicy::RecordToggle => registry.coin_flip(),
        };

        if !populate {
            return Ok(Record::blank(schema.clone()));
        }

        let values = schema
            .fields()
            .iter()
            .map(|name| registry.value_for(name))
            .collect();

        Record::new(schema.clone(), values)
    }
}

/// How values are chosen for columns appended to existing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillPolicy {
    /// New columns are left empty
    #[default]
    Empty,

    /// New columns are filled from the fake-field provider
    Generated,
}

impl BackfillPolicy {
    /// Values for the appended `columns` of one existing row
    pub fn values_for(self, columns: &[String], registry: &mut FieldRegistry) -> Vec<String> {
        match self {
            BackfillPolicy::Empty => vec![String::new(); columns.len()],
            BackfillPolicy::Generated => columns.iter().map(|c| registry.value_for(c)).collect(),
        }
    }
}

/// Outcome of filtering one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDecision {
    /// The row passes through
    Keep,
    /// The row is excluded (or reported as skipped)
    Skip,
}

impl fmt::Display for RowDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowDecision::Keep => write!(f, "KEEP"),
            RowDecision::Skip => write!(f, "SKIP"),
        }
    }
}

/// A per-row keep/skip rule
pub trait RowFilter {
    /// The first checked column that makes this row a skip, if any
    fn offending_column<'a>(&'a self, record: &Record) -> Option<&'a str>;

    /// Columns this filter inspects, in evaluation order
    fn checked_columns(&self) -> Vec<&str>;

    /// Decide whether the row is kept
    fn decide(&self, record: &Record) -> RowDecision {
        match self.offending_column(record) {
            Some(_) => RowDecision::Skip,
            None => RowDecision::Keep,
        }
    }

    /// Checked columns that `schema` does not contain
    fn missing_columns(&self, schema: &Schema) -> Vec<String> {
        self.checked_columns()
            .into_iter()
            .filter(|c| !schema.contains(c))
            .map(str::to_string)
            .collect()
    }
}

/// Skip a row when any checked column is empty.
///
/// With no checked columns every row is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmptinessFilter {
    columns: Vec<String>,
}

impl EmptinessFilter {
    /// Create a filter over the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Columns checked by this filter
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl RowFilter for EmptinessFilter {
    fn offending_column<'a>(&'a self, record: &Record) -> Option<&'a str> {
        self.columns
            .iter()
            .find(|c| record.is_empty_field(c))
            .map(String::as_str)
    }

    fn checked_columns(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

/// Skip a row when its gate column is empty, regardless of the other columns;
/// otherwise apply the any-empty rule to the remaining checked columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedFilter {
    gate: String,
    rest: EmptinessFilter,
}

impl GatedFilter {
    /// Create a gated filter. The gate is removed from `columns` if listed
    /// there.
    pub fn new(gate: impl Into<String>, columns: Vec<String>) -> Self {
        let gate = gate.into();
        let columns = columns.into_iter().filter(|c| *c != gate).collect();
        Self {
            gate,
            rest: EmptinessFilter::new(columns),
        }
    }

    /// Whether the gate alone rejects this row
    pub fn gate_closed(&self, record: &Record) -> bool {
        record.is_empty_field(&self.gate)
    }
}

impl RowFilter for GatedFilter {
    fn offending_column<'a>(&'a self, record: &Record) -> Option<&'a str> {
        if self.gate_closed(record) {
            return Some(&self.gate);
        }
        self.rest.offending_column(record)
    }

    fn checked_columns(&self) -> Vec<&str> {
        std::iter::once(self.gate.as_str())
            .chain(self.rest.columns().iter().map(String::as_str))
            .collect()
    }
}

/// The filter selected by a run's configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Plain any-empty rule
    Emptiness(EmptinessFilter),
    /// Gate column first, then the any-empty rule
    Gated(GatedFilter),
}

impl ColumnFilter {
    /// Build a filter from check columns and an optional gate column
    pub fn new(columns: Vec<String>, gate: Option<String>) -> Self {
        match gate {
            Some(gate) => ColumnFilter::Gated(GatedFilter::new(gate, columns)),
            None => ColumnFilter::Emptiness(EmptinessFilter::new(columns)),
        }
    }

    fn inner(&self) -> &dyn RowFilter {
        match self {
            ColumnFilter::Emptiness(filter) => filter,
            ColumnFilter::Gated(filter) => filter,
        }
    }
}

impl RowFilter for ColumnFilter {
    fn offending_column<'a>(&'a self, record: &Record) -> Option<&'a str> {
        self.inner().offending_column(record)
    }

    fn checked_columns(&self) -> Vec<&str> {
        self.inner().checked_columns()
    }
}
