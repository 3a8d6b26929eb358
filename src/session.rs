//! Session - Per-operation connection scoping.

use crate::backend::{Backend, Connection};
use crate::error::StoreError;

/// A live (connection, collection handle) pair scoped to one operation.
///
/// Opened at the start of an operation and closed exactly once before the
/// operation's result is delivered, on success and failure alike. Closing
/// consumes the session, so neither half can leak past release.
pub(crate) struct Session<B: Backend> {
    connection: B::Connection,
    collection: <B::Connection as Connection>::Collection,
}

impl<B: Backend> Session<B> {
    /// Establish a fresh backend session and resolve the named collection.
    /// Each call opens its own session; nothing is pooled or reused.
    pub(crate) async fn open(url: &str, collection_name: &str) -> Result<Self, StoreError> {
        let connection = B::connect(url)
            .await
            .map_err(|err| StoreError::Connection {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        let collection = connection.collection(collection_name);
        Ok(Self {
            connection,
            collection,
        })
    }

    pub(crate) fn collection(&self) -> &<B::Connection as Connection>::Collection {
        &self.collection
    }

    /// Release the backend session.
    pub(crate) async fn close(self) {
        self.connection.close().await;
    }
}
