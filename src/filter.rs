//! Filters - Field-equality document filters.

use serde_json::{Map, Value};

use crate::record::Record;

/// A document filter: a record matches when every criterion field equals the
/// given value. An empty filter matches every document.
///
/// A field the record does not carry compares as `Null`, so filtering on
/// `Null` selects records missing the field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    criteria: Map<String, Value>,
}

impl Filter {
    /// The empty filter: matches every document in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter on a single field equalling a value.
    pub fn field_equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut criteria = Map::new();
        criteria.insert(name.into(), value.into());
        Self { criteria }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Whether the record satisfies every criterion.
    pub fn matches(&self, record: &Record) -> bool {
        self.criteria
            .iter()
            .all(|(name, value)| record.get(name).unwrap_or(&Value::Null) == value)
    }
}
