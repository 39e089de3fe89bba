//! Ordered field-name schemas for tabular records

use std::collections::HashMap;
use std::fmt;

/// An ordered sequence of field names.
///
/// Column order is the order of first mention. Duplicate names are kept
/// literally, so a schema assembled from overlapping column lists writes one
/// header cell per mention; name lookups resolve to the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Field names in column order
    fields: Vec<String>,

    /// First position of each field name
    field_indices: HashMap<String, usize>,
}

impl Schema {
    /// Create a new schema from field names in column order
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let mut field_indices = HashMap::with_capacity(fields.len());
        for (i, name) in fields.iter().enumerate() {
            field_indices.entry(name.clone()).or_insert(i);
        }

        Self {
            fields,
            field_indices,
        }
    }

    /// Concatenate a base column list with additional columns.
    ///
    /// Additional columns are appended as given, without de-duplication
    /// against the base list.
    pub fn concat(base: &[String], additional: &[String]) -> Self {
        Self::new(base.iter().chain(additional.iter()).cloned())
    }

    /// A new schema with `columns` appended to this one
    pub fn extended(&self, columns: &[String]) -> Self {
        Self::concat(&self.fields, columns)
    }

    /// Get all field names in column order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Get the index of the first field with the given name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    /// Whether the schema names this field
    pub fn contains(&self, name: &str) -> bool {
        self.field_indices.contains_key(name)
    }

    /// Get the number of fields (including duplicates)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if this schema is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_concat_preserves_order() {
        let schema = Schema::concat(&names(&["name", "email"]), &names(&["phone"]));
        assert_eq!(schema.fields(), &names(&["name", "email", "phone"])[..]);
        assert_eq!(schema.index_of("phone"), Some(2));
    }

    #[test]
    fn test_concat_keeps_duplicates() {
        let schema = Schema::concat(&names(&["name", "email"]), &names(&["email"]));
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.to_string(), "name,email,email");
        assert_eq!(schema.index_of("email"), Some(1));
    }

    #[test]
    fn test_missing_field_has_no_index() {
        let schema = Schema::new(["a", "b"]);
        assert!(schema.contains("b"));
        assert_eq!(schema.index_of("c"), None);
    }
}
