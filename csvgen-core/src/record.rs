//! Row-oriented records conforming to a shared schema

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::schema::Schema;

/// A single row: one string value per schema field, in schema order.
///
/// The empty string is the only representation of "no value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Schema describing the values
    schema: Arc<Schema>,

    /// Values in schema order
    values: Vec<String>,
}

impl Record {
    /// Create a record, checking that it has one value per schema field
    pub fn new(schema: Arc<Schema>, values: Vec<String>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(Error::SchemaMismatch(format!(
                "Record has {} values, schema has {} fields",
                values.len(),
                schema.len()
            )));
        }

        Ok(Self { schema, values })
    }

    /// A record with every field set to the empty string
    pub fn blank(schema: Arc<Schema>) -> Self {
        let values = vec![String::new(); schema.len()];
        Self { schema, values }
    }

    /// Get the schema of this record
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Value of a field by name; a field the schema lacks reads as empty
    pub fn get(&self, name: &str) -> &str {
        self.schema
            .index_of(name)
            .and_then(|i| self.values.get(i))
            .map_or("", String::as_str)
    }

    /// Whether a field is empty or absent
    pub fn is_empty_field(&self, name: &str) -> bool {
        self.get(name).is_empty()
    }

    /// Values in schema order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no fields at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether this record conforms exactly to the given schema
    pub fn conforms_to(&self, schema: &Schema) -> bool {
        std::ptr::eq(self.schema.as_ref(), schema) || self.schema.as_ref() == schema
    }

    /// Re-home this record under a wider schema, appending `extra` values
    pub fn extend(self, schema: Arc<Schema>, extra: Vec<String>) -> Result<Self> {
        let mut values = self.values;
        values.extend(extra);
        Self::new(schema, values)
    }

    /// Render the record as a JSON object in schema order
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self.values))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.schema.fields().iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(["name", "email"]))
    }

    #[test]
    fn test_width_must_match_schema() {
        let err = Record::new(schema(), vec!["Ann".into()]).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_missing_field_reads_as_empty() {
        let record = Record::new(schema(), vec!["Ann".into(), "a@x.com".into()]).unwrap();
        assert_eq!(record.get("name"), "Ann");
        assert_eq!(record.get("phone"), "");
        assert!(record.is_empty_field("phone"));
        assert!(!record.is_empty_field("email"));
    }

    #[test]
    fn test_json_keeps_schema_order() {
        let record = Record::new(schema(), vec!["Ann".into(), String::new()]).unwrap();
        assert_eq!(record.to_json(), r#"{"name":"Ann","email":""}"#);
    }

    #[test]
    fn test_extend_appends_values() {
        let record = Record::new(schema(), vec!["Ann".into(), "a@x.com".into()]).unwrap();
        let wider = Arc::new(schema().extended(&["phone".to_string()]));
        let record = record.extend(wider, vec![String::new()]).unwrap();
        assert_eq!(record.values(), &["Ann", "a@x.com", ""]);
    }
}
