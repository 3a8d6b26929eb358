//! TypedStore - Serde-typed accessor over a [`Store`].

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::Backend;
use crate::error::StoreError;
use crate::record::Record;
use crate::store::Store;

/// Typed view over a store, converting caller structs to and from records at
/// the boundary.
///
/// The storage identity never crosses the boundary: typed callers see only
/// their own fields, and updates re-establish identity through the business
/// key like every other update.
pub struct TypedStore<'a, B: Backend, T> {
    store: &'a Store<B>,
    _marker: PhantomData<T>,
}

impl<B: Backend> Store<B> {
    /// A typed accessor over this store.
    pub fn typed<T: Serialize + DeserializeOwned>(&self) -> TypedStore<'_, B, T> {
        TypedStore {
            store: self,
            _marker: PhantomData,
        }
    }
}

impl<'a, B: Backend, T: Serialize + DeserializeOwned> TypedStore<'a, B, T> {
    pub async fn load(&self, items: &[T]) -> Result<usize, StoreError> {
        let records = items.iter().map(to_record).collect::<Result<Vec<_>, _>>()?;
        self.store.load(records).await
    }

    pub async fn add(&self, item: &T) -> Result<usize, StoreError> {
        self.store.add(to_record(item)?).await
    }

    pub async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let records = self.store.find_all().await?;
        records.into_iter().map(from_record).collect()
    }

    pub async fn find(&self, key: impl Into<Value>) -> Result<Option<T>, StoreError> {
        match self.store.find(key).await? {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn update(&self, item: &T) -> Result<(), StoreError> {
        self.store.update(to_record(item)?).await
    }

    pub async fn remove(&self, key: impl Into<Value>) -> Result<Option<T>, StoreError> {
        match self.store.remove(key).await? {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }
}

fn to_record<T: Serialize>(item: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(item) {
        Ok(Value::Object(fields)) => Ok(Record::from_fields(fields)),
        Ok(other) => Err(StoreError::Record(format!(
            "expected an object, got {}",
            other
        ))),
        Err(err) => Err(StoreError::Record(err.to_string())),
    }
}

fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(record.into_fields()))
        .map_err(|err| StoreError::Record(err.to_string()))
}
