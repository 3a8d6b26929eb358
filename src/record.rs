//! Records - Untyped documents as stored and retrieved by backends.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend-assigned storage identity of a persisted document.
///
/// Distinct from the business key declared by the model: the backend assigns
/// it on first persist, and updates target the stored document through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An untyped record: a mapping of field name to value, plus the storage
/// identity once the backend has assigned one.
///
/// The identity round-trips through serialization under the reserved `_id`
/// field, so a record fetched from a backend can be saved back to the same
/// stored document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<DocumentId>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Record {
    /// Create an empty record with no fields and no storage identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from an existing field map.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { id: None, fields }
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field value by name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// All caller-visible fields (the storage identity is not among them).
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the record, yielding its field map without the identity.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// The storage identity, if this record has been persisted.
    pub fn document_id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    /// Attach a storage identity so a save targets that stored document.
    pub fn set_document_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}
