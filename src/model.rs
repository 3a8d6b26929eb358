//! Models - The data-model collaborator seam.
//!
//! The store consumes a deliberately narrow slice of whatever schema system
//! the caller uses: the model's name and its declared key field. Field
//! typing, validation and record construction stay on the caller's side.

/// Descriptor of the field that uniquely identifies records of a model.
///
/// The name doubles as the filter attribute for key-based lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyField {
    name: String,
}

impl KeyField {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Abstract data model as seen by the store.
///
/// A model may declare no key field; key-based operations on such a model
/// fail fast without touching the backend.
pub trait Model {
    /// The model's name, used for error context.
    fn name(&self) -> &str;

    /// The declared key field, if any.
    fn key(&self) -> Option<&KeyField>;
}

/// Minimal concrete [`Model`] for callers without a full schema system.
#[derive(Debug, Clone)]
pub struct ModelDef {
    name: String,
    key: Option<KeyField>,
}

impl ModelDef {
    /// A model with no key field. Supports load/add/findAll only.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
        }
    }

    /// A model keyed by the named field.
    pub fn with_key(name: impl Into<String>, key_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: Some(KeyField::new(key_field)),
        }
    }
}

impl Model for ModelDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> Option<&KeyField> {
        self.key.as_ref()
    }
}
