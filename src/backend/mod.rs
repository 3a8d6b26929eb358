//! Backend seam - The narrow driver interface the store consumes.
//!
//! A backend is whatever actually holds the data: a document database, a
//! network service, or the in-process [`memory`] implementation. The store
//! only ever asks it for a fresh connection, a collection handle, and the
//! four primitive collection actions. Wire protocol, encoding and server
//! discovery all stay on the driver's side of this seam.

#[cfg(feature = "memory")]
pub mod memory;

use std::fmt;

use async_trait::async_trait;

use crate::filter::Filter;
use crate::record::{DocumentId, Record};

/// Error type for backend drivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// A session with the backing store could not be established.
    Connect(String),
    /// A handle was used after its owning connection was released.
    ConnectionClosed,
    /// The backend failed a collection action.
    Operation {
        operation: &'static str,
        message: String,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Connect(message) => write!(f, "connect failed: {}", message),
            BackendError::ConnectionClosed => write!(f, "connection already closed"),
            BackendError::Operation { operation, message } => {
                write!(f, "{} failed: {}", operation, message)
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Entry point of a backend driver.
///
/// The store calls [`connect`](Backend::connect) once per operation and never
/// pools or reuses the sessions it gets back.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    type Connection: Connection;

    /// Establish a new session with the backing store at the given URL.
    async fn connect(url: &str) -> Result<Self::Connection, BackendError>;
}

/// A live backend session.
#[async_trait]
pub trait Connection: Send + Sync {
    type Collection: Collection;

    /// Resolve a handle to the named collection. Resolving is local; the
    /// handle stays valid only as long as this connection is open.
    fn collection(&self, name: &str) -> Self::Collection;

    /// Release the session. Consumes the connection so it cannot be released
    /// twice; handles obtained from it fail afterwards.
    async fn close(self);
}

/// A handle to one collection within an open connection.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Insert a batch of records, returning how many were inserted.
    async fn insert(&self, batch: Vec<Record>) -> Result<usize, BackendError>;

    /// Every record matching the filter, in backend-defined order.
    async fn find(&self, filter: &Filter) -> Result<Vec<Record>, BackendError>;

    /// Upsert by storage identity: a record whose identity names an existing
    /// document replaces it in place; any other record is inserted.
    async fn save(&self, record: Record) -> Result<DocumentId, BackendError>;

    /// Delete every document matching the filter, returning the count.
    async fn remove(&self, filter: &Filter) -> Result<u64, BackendError>;
}
