mod backend;
mod error;
mod filter;
mod model;
mod record;
mod session;
mod store;
mod typed;

pub use backend::{Backend, BackendError, Collection, Connection};
pub use error::StoreError;
pub use filter::Filter;
pub use model::{KeyField, Model, ModelDef};
pub use record::{DocumentId, Record};
pub use store::Store;
pub use typed::TypedStore;

// In-process backend for development and testing
#[cfg(feature = "memory")]
pub use backend::memory::{Fault, MemoryBackend};
