//! Connection lifecycle: one connection per operation, released on every
//! exit path, success and failure alike.

use model_store_rust::{Fault, MemoryBackend, StoreError};

use crate::support::{sample_users, user, url, user_store};

#[tokio::test]
async fn each_operation_uses_exactly_one_connection() {
    let database = url("lifecycle-counting");
    let store = user_store("lifecycle-counting");

    store.load(sample_users()).await.unwrap();
    assert_eq!(MemoryBackend::total_connections(&database), 1);
    assert_eq!(MemoryBackend::open_connections(&database), 0);

    store.add(user("c@x.com", "Grace", "Hopper")).await.unwrap();
    assert_eq!(MemoryBackend::total_connections(&database), 2);
    assert_eq!(MemoryBackend::open_connections(&database), 0);

    store.find_all().await.unwrap();
    assert_eq!(MemoryBackend::total_connections(&database), 3);
    assert_eq!(MemoryBackend::open_connections(&database), 0);

    store.find("a@x.com").await.unwrap();
    assert_eq!(MemoryBackend::total_connections(&database), 4);
    assert_eq!(MemoryBackend::open_connections(&database), 0);

    store.update(user("a@x.com", "Augusta", "King")).await.unwrap();
    assert_eq!(MemoryBackend::total_connections(&database), 5);
    assert_eq!(MemoryBackend::open_connections(&database), 0);

    store.remove("a@x.com").await.unwrap();
    assert_eq!(MemoryBackend::total_connections(&database), 6);
    assert_eq!(MemoryBackend::open_connections(&database), 0);
}

#[tokio::test]
async fn unsupported_url_surfaces_connection_error() {
    let model = model_store_rust::ModelDef::with_key("User", "email");
    let store: model_store_rust::Store<MemoryBackend> =
        model_store_rust::Store::new(&model, "mongodb://localhost:27017", "user");

    let err = store.find_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Connection { .. }));
}

#[tokio::test]
async fn connect_fault_fails_before_the_action() {
    let database = url("lifecycle-connect-fault");
    let store = user_store("lifecycle-connect-fault");
    store.load(sample_users()).await.unwrap();

    MemoryBackend::inject_fault(&database, Fault::Connect);
    let err = store.add(user("c@x.com", "Grace", "Hopper")).await.unwrap_err();
    assert!(matches!(err, StoreError::Connection { .. }));

    // the action never ran and nothing was left open
    assert_eq!(store.find_all().await.unwrap().len(), 2);
    assert_eq!(MemoryBackend::open_connections(&database), 0);
}

#[tokio::test]
async fn insert_failure_still_releases_the_connection() {
    let database = url("lifecycle-insert-fault");
    let store = user_store("lifecycle-insert-fault");

    MemoryBackend::inject_fault(&database, Fault::Insert);
    let err = store.load(sample_users()).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Backend {
            operation: "insert",
            ..
        }
    ));
    assert_eq!(MemoryBackend::open_connections(&database), 0);
    assert_eq!(MemoryBackend::total_connections(&database), 1);
}

#[tokio::test]
async fn find_failure_still_releases_the_connection() {
    let database = url("lifecycle-find-fault");
    let store = user_store("lifecycle-find-fault");
    store.load(sample_users()).await.unwrap();

    MemoryBackend::inject_fault(&database, Fault::Find);
    let err = store.find("a@x.com").await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Backend {
            operation: "find",
            ..
        }
    ));
    assert_eq!(MemoryBackend::open_connections(&database), 0);
}

#[tokio::test]
async fn save_failure_mid_update_still_releases_the_connection() {
    let database = url("lifecycle-save-fault");
    let store = user_store("lifecycle-save-fault");
    store.add(user("a@x.com", "Ada", "Lovelace")).await.unwrap();

    // the update's lookup succeeds, the save that follows fails
    MemoryBackend::inject_fault(&database, Fault::Save);
    let err = store.update(user("a@x.com", "Augusta", "King")).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Backend {
            operation: "save",
            ..
        }
    ));
    assert_eq!(MemoryBackend::open_connections(&database), 0);

    // the stored record is untouched
    let found = store.find("a@x.com").await.unwrap().unwrap();
    assert_eq!(found.get("first_name"), Some(&serde_json::json!("Ada")));
}

#[tokio::test]
async fn remove_failure_still_releases_the_connection() {
    let database = url("lifecycle-remove-fault");
    let store = user_store("lifecycle-remove-fault");
    store.load(sample_users()).await.unwrap();

    MemoryBackend::inject_fault(&database, Fault::Remove);
    let err = store.remove("a@x.com").await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Backend {
            operation: "remove",
            ..
        }
    ));
    assert_eq!(MemoryBackend::open_connections(&database), 0);
    assert_eq!(store.find_all().await.unwrap().len(), 2);
}
