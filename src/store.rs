//! Store - Model-driven CRUD over a pluggable backend.
//!
//! Every operation acquires its own backend session, performs exactly one
//! action against the collection, and releases the session before the result
//! is reported. Operations therefore never share connection state; the only
//! thing concurrent calls have in common is the backing collection itself.
//!
//! ## Example
//!
//! ```ignore
//! use model_store_rust::{MemoryBackend, ModelDef, Record, Store};
//!
//! let model = ModelDef::with_key("User", "email");
//! let store: Store<MemoryBackend> = Store::new(&model, "memory://app", "user");
//!
//! store.add(Record::new().with("email", "a@x.com")).await?;
//! let found = store.find("a@x.com").await?;
//! ```

use std::marker::PhantomData;

use serde_json::Value;

use crate::backend::{Backend, Collection};
use crate::error::StoreError;
use crate::filter::Filter;
use crate::model::{KeyField, Model};
use crate::record::Record;
use crate::session::Session;

/// A store bound to one model, backend URL and collection name.
///
/// Construction is pure value assignment; no I/O happens until the first
/// operation. The key descriptor is resolved off the model once, here, and
/// never re-derived per call. The instance holds no connection state between
/// operations and is freely shareable across tasks.
pub struct Store<B: Backend> {
    url: String,
    collection_name: String,
    model_name: String,
    key: Option<KeyField>,
    _backend: PhantomData<B>,
}

impl<B: Backend> Store<B> {
    pub fn new(
        model: &dyn Model,
        url: impl Into<String>,
        collection_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            collection_name: collection_name.into(),
            model_name: model.name().to_string(),
            key: model.key().cloned(),
            _backend: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// The key field resolved at construction, if the model declared one.
    pub fn key(&self) -> Option<&KeyField> {
        self.key.as_ref()
    }

    fn key_field(&self) -> Result<&KeyField, StoreError> {
        self.key.as_ref().ok_or_else(|| StoreError::KeyMissing {
            model: self.model_name.clone(),
        })
    }

    fn key_filter(&self, key: Value) -> Result<Filter, StoreError> {
        let field = self.key_field()?;
        Ok(Filter::field_equals(field.name(), key))
    }

    async fn session(&self) -> Result<Session<B>, StoreError> {
        Session::open(&self.url, &self.collection_name).await
    }

    /// Bulk-insert a batch of records, returning how many were inserted.
    ///
    /// The whole batch goes to the backend in a single action. An empty batch
    /// still runs a full connect/act/close cycle and returns 0.
    pub async fn load(&self, records: Vec<Record>) -> Result<usize, StoreError> {
        let session = self.session().await?;
        let result = session.collection().insert(records).await;
        session.close().await;
        result.map_err(|err| StoreError::backend("insert", err))
    }

    /// Insert a single record: a one-element batch through the load path.
    /// Duplicate business keys are not rejected at this layer.
    pub async fn add(&self, record: Record) -> Result<usize, StoreError> {
        self.load(vec![record]).await
    }

    /// Every record in the collection, in backend-defined order.
    pub async fn find_all(&self) -> Result<Vec<Record>, StoreError> {
        let session = self.session().await?;
        let result = session.collection().find(&Filter::all()).await;
        session.close().await;
        result.map_err(|err| StoreError::backend("find", err))
    }

    /// The first record whose key field equals the given value.
    ///
    /// No match is `Ok(None)`, not an error. Fails with
    /// [`StoreError::KeyMissing`] before any I/O if the model has no key.
    pub async fn find(&self, key: impl Into<Value>) -> Result<Option<Record>, StoreError> {
        let filter = self.key_filter(key.into())?;
        let session = self.session().await?;
        let result = session.collection().find(&filter).await;
        session.close().await;
        let mut matches = result.map_err(|err| StoreError::backend("find", err))?;
        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches.swap_remove(0)))
        }
    }

    /// Upsert a full replacement record by its business key.
    ///
    /// The key value is read out of the record under the key field's name;
    /// a record without it upserts under a null key. When a stored record
    /// with the same key exists, its storage identity is carried onto the
    /// incoming record so the save replaces the same document; otherwise the
    /// save inserts a new one.
    pub async fn update(&self, record: Record) -> Result<(), StoreError> {
        let field = self.key_field()?;
        let key = record.get(field.name()).cloned().unwrap_or(Value::Null);
        let filter = Filter::field_equals(field.name(), key);

        let session = self.session().await?;
        let result = Self::upsert(&session, &filter, record).await;
        session.close().await;
        result
    }

    /// Two-step upsert: look up the stored document with the same business
    /// key, carry its storage identity onto the incoming record, then save.
    /// The steps are not atomic; concurrent updates to the same key race at
    /// the backend, last write wins.
    async fn upsert(
        session: &Session<B>,
        filter: &Filter,
        mut record: Record,
    ) -> Result<(), StoreError> {
        let existing = session
            .collection()
            .find(filter)
            .await
            .map_err(|err| StoreError::backend("find", err))?;
        if let Some(found) = existing.into_iter().next() {
            if let Some(id) = found.document_id() {
                record.set_document_id(id.clone());
            }
        }
        session
            .collection()
            .save(record)
            .await
            .map_err(|err| StoreError::backend("save", err))?;
        Ok(())
    }

    /// Delete the record whose key field equals the given value, returning
    /// the record as it was stored before deletion.
    ///
    /// Removing a key with no match is `Ok(None)`, not an error, mirroring
    /// [`find`](Store::find).
    pub async fn remove(&self, key: impl Into<Value>) -> Result<Option<Record>, StoreError> {
        let filter = self.key_filter(key.into())?;
        let session = self.session().await?;
        let result = Self::take_and_remove(&session, &filter).await;
        session.close().await;
        result
    }

    /// Capture the first match before deleting everything the filter hits.
    /// With unique keys that is at most one document.
    async fn take_and_remove(
        session: &Session<B>,
        filter: &Filter,
    ) -> Result<Option<Record>, StoreError> {
        let matches = session
            .collection()
            .find(filter)
            .await
            .map_err(|err| StoreError::backend("find", err))?;
        let captured = matches.into_iter().next();
        session
            .collection()
            .remove(filter)
            .await
            .map_err(|err| StoreError::backend("remove", err))?;
        Ok(captured)
    }
}
