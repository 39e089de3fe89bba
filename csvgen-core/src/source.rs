//! Record sources: finite, single-pass sequences of records

use std::sync::Arc;

use crate::error::Result;
use crate::policy::GenerationPolicy;
use crate::provider::FieldRegistry;
use crate::record::Record;
use crate::schema::Schema;

/// A lazy, finite, single-pass source of records.
///
/// `Ok(None)` signals completion and `Err` signals failure; after either, the
/// source yields `Ok(None)`.
pub trait RecordSource {
    /// Schema shared by every record this source produces
    fn schema(&self) -> &Arc<Schema>;

    /// Retrieve the next record, or `None` when exhausted
    fn next_record(&mut self) -> Result<Option<Record>>;

    /// Provides a hint about the number of remaining records (if known)
    fn row_count_hint(&self) -> Option<usize> {
        None
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn schema(&self) -> &Arc<Schema> {
        (**self).schema()
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        (**self).next_record()
    }

    fn row_count_hint(&self) -> Option<usize> {
        (**self).row_count_hint()
    }
}

/// Produces exactly `rows` synthetic records over a schema.
///
/// Values come from the run's [`FieldRegistry`], so two sources over the same
/// schema produce different records unless both registries share a seed.
#[derive(Debug)]
pub struct SyntheticSource {
    /// Schema of every generated record
    schema: Arc<Schema>,

    /// Records still to produce
    remaining: usize,

    /// Fake-field provider for this run
    registry: FieldRegistry,

    /// How each record is populated
    policy: GenerationPolicy,
}

impl SyntheticSource {
    /// Create a synthetic source
    pub fn new(
        schema: Arc<Schema>,
        rows: usize,
        mut registry: FieldRegistry,
        policy: GenerationPolicy,
    ) -> Self {
        registry.register_all(schema.fields());
        Self {
            schema,
            remaining: rows,
            registry,
            policy,
        }
    }

    /// Give the registry back once the source is done
    pub fn into_registry(self) -> FieldRegistry {
        self.registry
    }
}

impl RecordSource for SyntheticSource {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.policy
            .build_record(&self.schema, &mut self.registry)
            .map(Some)
    }

    fn row_count_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// A source over records already in memory
#[cfg(test)]
#[derive(Debug)]
pub struct MemorySource {
    schema: Arc<Schema>,
    records: std::vec::IntoIter<Record>,
}

#[cfg(test)]
impl MemorySource {
    /// Create a source over `records`, all of which must share `schema`
    pub fn new(schema: Arc<Schema>, records: Vec<Record>) -> Self {
        Self {
            schema,
            records: records.into_iter(),
        }
    }

    /// Build a source from a header and string rows
    pub fn from_rows(header: &[&str], rows: &[&[&str]]) -> Result<Self> {
        let schema = Arc::new(Schema::new(header.iter().copied()));
        let records = rows
            .iter()
            .map(|row| Record::new(schema.clone(), row.iter().map(|v| (*v).to_string()).collect()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(schema, records))
    }
}

#[cfg(test)]
impl RecordSource for MemorySource {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.records.next())
    }

    fn row_count_hint(&self) -> Option<usize> {
        Some(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_source_yields_exactly_n() {
        let schema = Arc::new(Schema::new(["name", "email"]));
        let mut source =
            SyntheticSource::new(schema, 3, FieldRegistry::seeded(1), GenerationPolicy::AlwaysPopulate);
        assert_eq!(source.row_count_hint(), Some(3));

        let mut count = 0;
        while let Some(record) = source.next_record().unwrap() {
            assert_eq!(record.len(), 2);
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_synthetic_source_binds_schema_fields_up_front() {
        let schema = Arc::new(Schema::new(["name", "shoe_size"]));
        let source =
            SyntheticSource::new(schema, 0, FieldRegistry::seeded(1), GenerationPolicy::RecordToggle);
        let registry = source.into_registry();
        assert!(registry.is_bound("name"));
        assert!(registry.is_bound("shoe_size"));
    }

    #[test]
    fn test_memory_source_from_rows() {
        let mut source = MemorySource::from_rows(&["a", "b"], &[&["1", "2"], &["3", ""]]).unwrap();
        assert_eq!(source.next_record().unwrap().unwrap().get("b"), "2");
        assert_eq!(source.next_record().unwrap().unwrap().get("b"), "");
        assert!(source.next_record().unwrap().is_none());
    }
}
