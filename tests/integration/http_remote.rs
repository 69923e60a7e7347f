//! Integration tests for the HTTP remote against the demo server.
//!
//! Each test starts its own server on an ephemeral port and talks to it
//! through [`HttpRemote`], directly and through the task store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use taskboard::remote::http::HttpRemote;
use taskboard::remote::{RemoteCollection, RemoteError};
use taskboard::store::{Lifecycle, Reconcile, StoreError, StoreOptions, TaskStore};
use taskboard_proto::task::{OwnerRef, Task, TaskDraft, TaskId, TaskPatch};
use taskboard_server::server::{self, ServerState};
use taskboard_server::store::TodoStore;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Starts a demo server that fabricates writes.
async fn fabricating_server() -> HttpRemote {
    let (addr, _handle) = server::start_server("127.0.0.1:0")
        .await
        .expect("failed to start server");
    HttpRemote::new(&format!("http://{addr}")).unwrap()
}

/// Starts a demo server that applies writes.
async fn persisting_server() -> HttpRemote {
    let state = Arc::new(ServerState::new(TodoStore::with_demo_tasks(true)));
    let (addr, _handle) = server::start_server_with_state("127.0.0.1:0", state)
        .await
        .expect("failed to start server");
    HttpRemote::new(&format!("http://{addr}")).unwrap()
}

// ---------------------------------------------------------------------------
// Remote calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_all_unwraps_envelope() {
    let remote = fabricating_server().await;
    let tasks = remote.list_all().await.unwrap();
    assert_eq!(tasks.len(), 6);
    assert_eq!(tasks[0].id, TaskId::new(1));
}

#[tokio::test]
async fn create_returns_server_entity() {
    let remote = fabricating_server().await;
    let created = remote
        .create(&TaskDraft::new("buy milk", OwnerRef::new(4)))
        .await
        .unwrap();
    assert_eq!(created.id, TaskId::new(7));
    assert_eq!(created.description, "buy milk");
    assert_eq!(created.owner, OwnerRef::new(4));
    assert!(!created.completed);
}

#[tokio::test]
async fn update_returns_merged_representation() {
    let remote = fabricating_server().await;
    let ack = remote
        .update(TaskId::new(1), &TaskPatch::completed(true))
        .await
        .unwrap()
        .expect("server returns the merged task");
    assert_eq!(ack.id, TaskId::new(1));
    assert!(ack.completed);
}

#[tokio::test]
async fn unknown_id_maps_to_not_found() {
    let remote = fabricating_server().await;
    let id = TaskId::new(404);
    assert_eq!(
        remote.update(id, &TaskPatch::completed(true)).await,
        Err(RemoteError::NotFound(id))
    );
    assert_eq!(remote.remove(id).await, Err(RemoteError::NotFound(id)));
}

#[tokio::test]
async fn server_validation_surfaces_message() {
    let remote = fabricating_server().await;
    let err = remote
        .create(&TaskDraft::new("   ", OwnerRef::new(1)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RemoteError::Status {
            status: 400,
            message: "task description cannot be empty".to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = HttpRemote::new(&format!("http://{addr}")).unwrap();
    assert!(matches!(
        remote.list_all().await,
        Err(RemoteError::Transport(_))
    ));
}

#[tokio::test]
async fn fabricated_create_skips_live_ids() {
    let seed = vec![
        Task {
            id: TaskId::new(2),
            description: "pay rent".to_string(),
            completed: false,
            owner: OwnerRef::new(1),
        },
        Task {
            id: TaskId::new(3),
            description: "call mom".to_string(),
            completed: false,
            owner: OwnerRef::new(1),
        },
    ];
    let state = Arc::new(ServerState::new(TodoStore::new(seed.clone(), false)));
    let (addr, _handle) = server::start_server_with_state("127.0.0.1:0", state)
        .await
        .expect("failed to start server");
    let store = TaskStore::new(HttpRemote::new(&format!("http://{addr}")).unwrap());
    store.load().await.unwrap();

    let created = store.add_task("buy milk", OwnerRef::new(1)).await.unwrap();

    assert_eq!(created.id, TaskId::new(4));
    let tasks = store.snapshot().tasks;
    assert_eq!(&tasks[..2], &seed[..]);
    assert_eq!(tasks[2], created);
}

// ---------------------------------------------------------------------------
// Store over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_against_fabricating_server() {
    let store = TaskStore::new(fabricating_server().await);
    assert_eq!(store.load().await.unwrap(), 6);

    let created = store.add_task("water plants", OwnerRef::new(1)).await.unwrap();
    assert_eq!(store.count(), 7);

    // The server never stored it, so it cannot be updated there.
    let updated = store.set_completed(created.id, true).await;
    assert!(matches!(
        updated,
        Err(StoreError::Remote(RemoteError::NotFound(_)))
    ));

    assert!(store.remove_task(TaskId::new(2)).await.unwrap());
    assert_eq!(store.count(), 6);

    // A reload shows the server's unchanged list.
    assert_eq!(store.load().await.unwrap(), 6);
    assert_eq!(store.snapshot().lifecycle, Lifecycle::Succeeded);
}

#[tokio::test]
async fn store_against_persisting_server() {
    let options = StoreOptions {
        reconcile: Reconcile::TrustServer,
        ..StoreOptions::default()
    };
    let store = TaskStore::with_options(persisting_server().await, options);
    store.load().await.unwrap();

    let created = store.add_task("water plants", OwnerRef::new(1)).await.unwrap();
    store
        .edit_task(created.id, TaskPatch::description("water all plants"))
        .await
        .unwrap();
    store.remove_task(TaskId::new(1)).await.unwrap();
    let local = store.snapshot().tasks;

    store.load().await.unwrap();
    assert_eq!(store.snapshot().tasks, local);
    assert_eq!(
        store.get(created.id).unwrap().description,
        "water all plants"
    );
}
