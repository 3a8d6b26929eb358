//! Test domain: a user collection keyed by email.

use model_store_rust::{MemoryBackend, ModelDef, Record, Store};

/// A store over a fresh memory database. Each test passes its own database
/// name so suites stay isolated while sharing the process-global registry.
pub fn user_store(database: &str) -> Store<MemoryBackend> {
    let model = ModelDef::with_key("User", "email");
    Store::new(&model, url(database), "user")
}

pub fn url(database: &str) -> String {
    format!("memory://{}", database)
}

pub fn user(email: &str, first_name: &str, last_name: &str) -> Record {
    Record::new()
        .with("email", email)
        .with("first_name", first_name)
        .with("last_name", last_name)
}

/// The two-user fixture the CRUD tests start from.
pub fn sample_users() -> Vec<Record> {
    vec![
        user("a@x.com", "Ada", "Lovelace"),
        user("b@x.com", "Barbara", "Liskov"),
    ]
}
