//! Integration tests for synchronizing the task store against a remote.
//!
//! Covers the add / edit / delete-miss / failed-load scenarios, ordering of
//! overlapping calls, reconciliation modes, and snapshot publication.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use taskboard::remote::memory::InMemoryRemote;
use taskboard::remote::{RemoteError, RemoteOp};
use taskboard::store::{
    Lifecycle, OperationKind, OperationStatus, Reconcile, StoreError, StoreOptions,
    StoreSnapshot, TaskStore,
};
use taskboard_proto::task::{OwnerRef, Task, TaskError, TaskId, TaskPatch};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn task(id: u64, description: &str, completed: bool) -> Task {
    Task {
        id: TaskId::new(id),
        description: description.to_string(),
        completed,
        owner: OwnerRef::new(1),
    }
}

/// Builds a loaded store over a remote holding `tasks`.
async fn loaded_store(tasks: Vec<Task>) -> Arc<TaskStore<InMemoryRemote>> {
    let store = Arc::new(TaskStore::new(InMemoryRemote::with_tasks(tasks)));
    store.load().await.unwrap();
    store
}

/// Waits until the remote has seen `n` calls of `op`.
async fn wait_for_calls(remote: &InMemoryRemote, op: RemoteOp, n: usize) {
    while remote.calls(op) < n {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_appends_server_entity() {
    let remote = InMemoryRemote::with_tasks(vec![task(100, "old", false)]);
    remote.set_tasks(Vec::new());
    let store = TaskStore::new(remote);

    let created = store.add_task("buy milk", OwnerRef::new(1)).await.unwrap();

    assert_eq!(created, task(101, "buy milk", false));
    assert_eq!(store.snapshot().tasks, vec![task(101, "buy milk", false)]);
}

#[tokio::test]
async fn edit_preserves_untouched_fields() {
    let store = loaded_store(vec![task(1, "x", false)]).await;

    let updated = store
        .edit_task(TaskId::new(1), TaskPatch::completed(true))
        .await
        .unwrap();

    assert_eq!(updated, Some(task(1, "x", true)));
    assert_eq!(store.snapshot().tasks, vec![task(1, "x", true)]);
}

#[tokio::test]
async fn delete_miss_leaves_collection_unchanged() {
    let store = loaded_store(vec![task(1, "x", false)]).await;

    let removed = store.remove_task(TaskId::new(2)).await.unwrap();

    assert!(!removed);
    assert_eq!(store.snapshot().tasks, vec![task(1, "x", false)]);
    assert_eq!(store.snapshot().last_error, None);
}

#[tokio::test]
async fn failed_load_preserves_prior_data() {
    let store = loaded_store(vec![task(1, "x", false)]).await;
    store
        .remote()
        .fail_next(RemoteOp::List, RemoteError::Transport("connection reset".into()));

    let err = store.load().await.unwrap_err();

    let snapshot = store.snapshot();
    assert!(matches!(err, StoreError::Remote(RemoteError::Transport(_))));
    assert_eq!(snapshot.tasks, vec![task(1, "x", false)]);
    assert_eq!(snapshot.lifecycle, Lifecycle::Failed);
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some("request failed: connection reset")
    );
}

#[tokio::test]
async fn reload_after_failure_recovers() {
    let store = loaded_store(vec![task(1, "x", false)]).await;
    store.remote().fail_next(RemoteOp::List, RemoteError::Unavailable);
    store.load().await.unwrap_err();

    store.remote().set_tasks(vec![task(1, "x", false), task(2, "y", true)]);
    assert_eq!(store.load().await.unwrap(), 2);
    assert_eq!(store.snapshot().lifecycle, Lifecycle::Succeeded);
}

// ---------------------------------------------------------------------------
// Validation happens before the network
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_input_makes_no_remote_call() {
    let store = loaded_store(vec![task(1, "x", false)]).await;

    assert_eq!(
        store.add_task("  ", OwnerRef::new(1)).await,
        Err(StoreError::Validation(TaskError::DescriptionEmpty))
    );
    assert_eq!(
        store.add_task(&"a".repeat(257), OwnerRef::new(1)).await,
        Err(StoreError::Validation(TaskError::DescriptionTooLong {
            max: 256
        }))
    );
    assert_eq!(
        store
            .edit_task(TaskId::new(1), TaskPatch::default())
            .await,
        Err(StoreError::Validation(TaskError::EmptyPatch))
    );

    assert_eq!(store.remote().calls(RemoteOp::Create), 0);
    assert_eq!(store.remote().calls(RemoteOp::Update), 0);
    assert!(store.snapshot().operations.is_empty());
}

#[tokio::test]
async fn configured_description_limit_applies() {
    let options = StoreOptions {
        max_description_len: 5,
        ..StoreOptions::default()
    };
    let store = TaskStore::with_options(InMemoryRemote::new(), options);
    assert!(store.add_task("12345", OwnerRef::new(1)).await.is_ok());
    assert!(store.add_task("123456", OwnerRef::new(1)).await.is_err());
}

// ---------------------------------------------------------------------------
// Failed mutations leave state untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_mutations_leave_collection_untouched() {
    let store = loaded_store(vec![task(1, "x", false)]).await;
    let before = store.snapshot().tasks;
    let remote = store.remote();
    remote.fail_next(RemoteOp::Create, RemoteError::Unavailable);
    remote.fail_next(RemoteOp::Update, RemoteError::Unavailable);
    remote.fail_next(RemoteOp::Remove, RemoteError::Unavailable);

    assert!(store.add_task("new", OwnerRef::new(1)).await.is_err());
    assert!(store.set_completed(TaskId::new(1), true).await.is_err());
    assert!(store.remove_task(TaskId::new(1)).await.is_err());

    let snapshot = store.snapshot();
    assert_eq!(snapshot.tasks, before);
    // Mutation failures never touch the load lifecycle.
    assert_eq!(snapshot.lifecycle, Lifecycle::Succeeded);
    assert_eq!(snapshot.last_error.as_deref(), Some("remote unavailable"));
    let failed = snapshot
        .operations
        .iter()
        .filter(|r| matches!(r.status, OperationStatus::Failed(_)))
        .count();
    assert_eq!(failed, 3);
}

#[tokio::test]
async fn strict_remote_not_found_is_an_error() {
    let store = loaded_store(vec![task(1, "x", false)]).await;
    store.remote().set_strict_ids(true);

    let err = store.remove_task(TaskId::new(9)).await.unwrap_err();
    assert_eq!(err, StoreError::Remote(RemoteError::NotFound(TaskId::new(9))));
    assert_eq!(store.count(), 1);
}

// ---------------------------------------------------------------------------
// Overlapping calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_loads_last_resolution_wins() {
    let store = Arc::new(TaskStore::new(InMemoryRemote::with_tasks(vec![task(
        1, "first", false,
    )])));
    let remote = store.remote();
    let first_gate = remote.hold_next(RemoteOp::List);
    let second_gate = remote.hold_next(RemoteOp::List);

    let first = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.load().await }
    });
    wait_for_calls(store.remote(), RemoteOp::List, 1).await;

    let second = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.load().await }
    });
    wait_for_calls(store.remote(), RemoteOp::List, 2).await;

    // Each call reads the list when its gate opens.
    store.remote().set_tasks(vec![task(2, "second", false)]);
    second_gate.release();
    second.await.unwrap().unwrap();
    assert_eq!(store.snapshot().tasks, vec![task(2, "second", false)]);
    assert_eq!(store.snapshot().lifecycle, Lifecycle::Loading);

    store.remote().set_tasks(vec![task(3, "third", false)]);
    first_gate.release();
    first.await.unwrap().unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.tasks, vec![task(3, "third", false)]);
    assert_eq!(snapshot.lifecycle, Lifecycle::Succeeded);
}

#[tokio::test]
async fn concurrent_adds_get_distinct_ids() {
    let store = loaded_store(Vec::new()).await;

    let results = join_all((0..8).map(|i| {
        let store = Arc::clone(&store);
        async move { store.add_task(&format!("task {i}"), OwnerRef::new(1)).await }
    }))
    .await;

    let ids: HashSet<TaskId> = results.into_iter().map(|r| r.unwrap().id).collect();
    assert_eq!(ids.len(), 8);
    assert_eq!(store.count(), 8);
    assert_eq!(store.snapshot().pending_operations(), 0);
}

#[tokio::test]
async fn overlapping_updates_resolve_independently() {
    let store = loaded_store(vec![task(1, "a", false), task(2, "b", false)]).await;
    let gate = store.remote().hold_next(RemoteOp::Update);

    let slow = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.set_completed(TaskId::new(1), true).await }
    });
    wait_for_calls(store.remote(), RemoteOp::Update, 1).await;
    assert_eq!(store.snapshot().pending_operations(), 1);

    store
        .edit_task(TaskId::new(2), TaskPatch::description("b2"))
        .await
        .unwrap();
    assert_eq!(store.get(TaskId::new(2)).unwrap().description, "b2");
    assert!(!store.get(TaskId::new(1)).unwrap().completed);

    gate.release();
    slow.await.unwrap().unwrap();
    assert!(store.get(TaskId::new(1)).unwrap().completed);
    assert_eq!(store.snapshot().pending_operations(), 0);
}

#[tokio::test]
async fn update_for_task_removed_meanwhile_is_ignored() {
    let store = loaded_store(vec![task(1, "a", false)]).await;
    let gate = store.remote().hold_next(RemoteOp::Update);

    let update = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.set_completed(TaskId::new(1), true).await }
    });
    wait_for_calls(store.remote(), RemoteOp::Update, 1).await;

    assert!(store.remove_task(TaskId::new(1)).await.unwrap());
    gate.release();

    assert_eq!(update.await.unwrap().unwrap(), None);
    assert_eq!(store.count(), 0);
}

// ---------------------------------------------------------------------------
// Reconciliation and fabricated backends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fabricated_ids_never_duplicate() {
    let store = loaded_store(Vec::new()).await;
    store.remote().set_fabricate(true);

    store.add_task("one", OwnerRef::new(1)).await.unwrap();
    store.add_task("two", OwnerRef::new(1)).await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.tasks, vec![task(1, "two", false)]);
}

#[tokio::test]
async fn created_id_held_by_loaded_task_keeps_existing_task() {
    let store = loaded_store(vec![task(2, "pay rent", false), task(3, "call mom", false)]).await;
    store.remote().set_next_id(3);

    let err = store.add_task("buy milk", OwnerRef::new(1)).await.unwrap_err();

    assert!(matches!(err, StoreError::Remote(RemoteError::Decode(_))));
    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.tasks,
        vec![task(2, "pay rent", false), task(3, "call mom", false)]
    );
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some("invalid response body: server returned id 3 already held")
    );
}

#[tokio::test]
async fn fabricated_id_reuse_after_reload_is_rejected() {
    let store = loaded_store(Vec::new()).await;
    store.remote().set_fabricate(true);
    store.add_task("one", OwnerRef::new(1)).await.unwrap();

    // After a reload the id belongs to a server task, not to this session.
    store.remote().set_tasks(vec![task(1, "server one", false)]);
    store.load().await.unwrap();
    store.remote().set_next_id(1);

    assert!(store.add_task("two", OwnerRef::new(1)).await.is_err());
    assert_eq!(store.snapshot().tasks, vec![task(1, "server one", false)]);
}

#[tokio::test]
async fn trust_server_takes_returned_representation() {
    let options = StoreOptions {
        reconcile: Reconcile::TrustServer,
        ..StoreOptions::default()
    };
    let store = TaskStore::with_options(
        InMemoryRemote::with_tasks(vec![task(1, "x", false)]),
        options,
    );
    store.load().await.unwrap();

    // Server-side state drifted since the load.
    store.remote().set_tasks(vec![task(1, "renamed elsewhere", false)]);
    let updated = store.set_completed(TaskId::new(1), true).await.unwrap();

    assert_eq!(updated, Some(task(1, "renamed elsewhere", true)));
}

#[tokio::test]
async fn trust_patch_ignores_returned_representation() {
    let store = loaded_store(vec![task(1, "x", false)]).await;
    store.remote().set_tasks(vec![task(1, "renamed elsewhere", false)]);

    let updated = store.set_completed(TaskId::new(1), true).await.unwrap();

    assert_eq!(updated, Some(task(1, "x", true)));
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscribers_see_loading_then_result() {
    let store = Arc::new(TaskStore::new(InMemoryRemote::with_demo_tasks()));
    let mut rx = store.subscribe();
    assert_eq!(*rx.borrow_and_update(), StoreSnapshot::default());

    let gate = store.remote().hold_next(RemoteOp::List);
    let load = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.load().await }
    });

    rx.wait_for(StoreSnapshot::is_loading).await.unwrap();
    gate.release();
    let snapshot = rx
        .wait_for(|s| s.lifecycle == Lifecycle::Succeeded)
        .await
        .unwrap()
        .clone();
    load.await.unwrap().unwrap();

    assert_eq!(snapshot.count(), 6);
    assert_eq!(snapshot.count_completed(), 2);
    assert_eq!(snapshot.count_pending(), 4);
}

#[tokio::test]
async fn operation_history_records_kinds_and_targets() {
    let store = loaded_store(vec![task(1, "x", false)]).await;
    let created = store.add_task("y", OwnerRef::new(1)).await.unwrap();
    store.set_completed(TaskId::new(1), true).await.unwrap();
    store.remove_task(created.id).await.unwrap();

    let ops = store.snapshot().operations;
    let summary: Vec<_> = ops.iter().map(|r| (r.kind, r.target)).collect();
    assert_eq!(
        summary,
        vec![
            (OperationKind::Create, Some(created.id)),
            (OperationKind::Update, Some(TaskId::new(1))),
            (OperationKind::Remove, Some(created.id)),
        ]
    );
    assert!(ops.iter().all(|r| r.status == OperationStatus::Succeeded));
}

#[tokio::test]
async fn clear_resets_everything() {
    let store = loaded_store(vec![task(1, "x", false)]).await;
    store.remote().fail_next(RemoteOp::Remove, RemoteError::Unavailable);
    store.remove_task(TaskId::new(1)).await.unwrap_err();

    store.clear();

    assert_eq!(store.snapshot(), StoreSnapshot::default());
}
