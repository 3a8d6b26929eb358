//! MemoryBackend - URL-addressed in-process backend for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use async_trait::async_trait;

use super::{Backend, BackendError, Collection, Connection};
use crate::filter::Filter;
use crate::record::{DocumentId, Record};

const SCHEME: &str = "memory://";

/// Which action the next injected failure hits. One-shot: the fault is
/// consumed by the first matching action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Connect,
    Insert,
    Find,
    Save,
    Remove,
}

/// One named database in the process-global registry.
struct Database {
    collections: Mutex<HashMap<String, Vec<Record>>>,
    next_id: AtomicU64,
    open_connections: AtomicUsize,
    total_connections: AtomicU64,
    pending_fault: Mutex<Option<Fault>>,
}

impl Database {
    fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            open_connections: AtomicUsize::new(0),
            total_connections: AtomicU64::new(0),
            pending_fault: Mutex::new(None),
        }
    }

    fn assign_id(&self) -> DocumentId {
        DocumentId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }

    /// Consume a pending fault if it matches the action about to run.
    fn take_fault(&self, kind: Fault) -> bool {
        let mut pending = match self.pending_fault.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *pending == Some(kind) {
            *pending = None;
            true
        } else {
            false
        }
    }
}

type Registry = RwLock<HashMap<String, Arc<Database>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn database(url: &str) -> Arc<Database> {
    if let Ok(map) = registry().read() {
        if let Some(db) = map.get(url) {
            return Arc::clone(db);
        }
    }
    let mut map = match registry().write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    Arc::clone(
        map.entry(url.to_string())
            .or_insert_with(|| Arc::new(Database::new())),
    )
}

/// In-process backend addressed by `memory://<name>` URLs.
///
/// Databases live in a process-global registry keyed by URL, so every
/// connection to the same URL reaches the same data. A store that opens a
/// fresh connection per operation therefore still sees its earlier writes,
/// the same way it would against a real server. Collections spring into
/// existence on first use; any non-`memory://` URL fails to connect.
///
/// The connection accounting and fault injection exist so the per-operation
/// connection lifecycle can be observed from tests.
pub struct MemoryBackend;

impl MemoryBackend {
    /// Arm a one-shot failure of the next matching action against this URL.
    pub fn inject_fault(url: &str, fault: Fault) {
        let db = database(url);
        let mut pending = match db.pending_fault.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *pending = Some(fault);
    }

    /// Connections currently open against this URL.
    pub fn open_connections(url: &str) -> usize {
        database(url).open_connections.load(Ordering::SeqCst)
    }

    /// Connections ever opened against this URL.
    pub fn total_connections(url: &str) -> u64 {
        database(url).total_connections.load(Ordering::SeqCst)
    }

    /// Drop the database behind this URL, data and counters included.
    pub fn reset(url: &str) {
        let mut map = match registry().write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.remove(url);
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    type Connection = MemoryConnection;

    async fn connect(url: &str) -> Result<MemoryConnection, BackendError> {
        if !url.starts_with(SCHEME) {
            return Err(BackendError::Connect(format!("unsupported url {}", url)));
        }
        let db = database(url);
        if db.take_fault(Fault::Connect) {
            return Err(BackendError::Connect(format!(
                "injected failure reaching {}",
                url
            )));
        }
        db.open_connections.fetch_add(1, Ordering::SeqCst);
        db.total_connections.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            db,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// A live session with one in-memory database.
pub struct MemoryConnection {
    db: Arc<Database>,
    closed: Arc<AtomicBool>,
}

impl std::fmt::Debug for MemoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    type Collection = MemoryCollection;

    fn collection(&self, name: &str) -> MemoryCollection {
        MemoryCollection {
            db: Arc::clone(&self.db),
            name: name.to_string(),
            closed: Arc::clone(&self.closed),
        }
    }

    async fn close(self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.db.open_connections.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Handle to one collection. Shares its connection's closed flag: once the
/// connection is released, every action on the handle fails.
pub struct MemoryCollection {
    db: Arc<Database>,
    name: String,
    closed: Arc<AtomicBool>,
}

impl MemoryCollection {
    fn guard(&self, fault: Fault, operation: &'static str) -> Result<(), BackendError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BackendError::ConnectionClosed);
        }
        if self.db.take_fault(fault) {
            return Err(BackendError::Operation {
                operation,
                message: "injected fault".to_string(),
            });
        }
        Ok(())
    }

    fn with_documents<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut HashMap<String, Vec<Record>>) -> T,
    ) -> Result<T, BackendError> {
        let mut collections = self.db.collections.lock().map_err(|_| {
            BackendError::Operation {
                operation,
                message: "lock poisoned".to_string(),
            }
        })?;
        Ok(f(&mut collections))
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    async fn insert(&self, batch: Vec<Record>) -> Result<usize, BackendError> {
        self.guard(Fault::Insert, "insert")?;
        let count = batch.len();
        self.with_documents("insert", |collections| {
            let documents = collections.entry(self.name.clone()).or_default();
            for mut record in batch {
                if record.document_id().is_none() {
                    record.set_document_id(self.db.assign_id());
                }
                documents.push(record);
            }
        })?;
        Ok(count)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Record>, BackendError> {
        self.guard(Fault::Find, "find")?;
        self.with_documents("find", |collections| match collections.get(&self.name) {
            Some(documents) => documents
                .iter()
                .filter(|document| filter.matches(document))
                .cloned()
                .collect(),
            None => Vec::new(),
        })
    }

    async fn save(&self, mut record: Record) -> Result<DocumentId, BackendError> {
        self.guard(Fault::Save, "save")?;
        let id = match record.document_id() {
            Some(id) => id.clone(),
            None => {
                let id = self.db.assign_id();
                record.set_document_id(id.clone());
                id
            }
        };
        self.with_documents("save", |collections| {
            let documents = collections.entry(self.name.clone()).or_default();
            match documents
                .iter_mut()
                .find(|document| document.document_id() == Some(&id))
            {
                Some(existing) => *existing = record,
                None => documents.push(record),
            }
        })?;
        Ok(id)
    }

    async fn remove(&self, filter: &Filter) -> Result<u64, BackendError> {
        self.guard(Fault::Remove, "remove")?;
        self.with_documents("remove", |collections| match collections.get_mut(&self.name) {
            Some(documents) => {
                let before = documents.len();
                documents.retain(|document| !filter.matches(document));
                (before - documents.len()) as u64
            }
            None => 0,
        })
    }
}
