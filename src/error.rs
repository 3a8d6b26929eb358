use std::fmt;

use crate::backend::BackendError;

/// Errors surfaced by store operations.
///
/// "Not found" is never among them: find and remove report a missing match as
/// an absent value, keeping absence-of-data distinct from failure-to-operate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A backend session could not be established. Fatal for the operation;
    /// never retried internally.
    Connection { url: String, message: String },
    /// The model declares no key field, so key-based operations cannot build
    /// a lookup. Raised before any I/O.
    KeyMissing { model: String },
    /// The backend failed the operation's action. Surfaced verbatim.
    Backend {
        operation: &'static str,
        message: String,
    },
    /// A typed value could not cross the record boundary.
    Record(String),
}

impl StoreError {
    pub(crate) fn backend(operation: &'static str, err: BackendError) -> Self {
        StoreError::Backend {
            operation,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection { url, message } => {
                write!(f, "cannot connect to {}: {}", url, message)
            }
            StoreError::KeyMissing { model } => {
                write!(f, "no key found for model {}", model)
            }
            StoreError::Backend { operation, message } => {
                write!(f, "backend {} failed: {}", operation, message)
            }
            StoreError::Record(message) => write!(f, "record conversion error: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}
