//! Client-side task collection synchronized against a [`RemoteCollection`].
//!
//! [`TaskStore`] owns the authoritative local copy of the collection. Every
//! mutation is pessimistic: the remote call is made first and the local
//! collection changes only after it succeeds. Each state change publishes a
//! fresh [`StoreSnapshot`] on a watch channel.
//!
//! The state mutex is never held across an `.await`; each resolution
//! re-reads the current state, so operations against different tasks can
//! resolve in any order.

pub mod lifecycle;
pub mod snapshot;

pub use lifecycle::{
    Lifecycle, OperationId, OperationKind, OperationLog, OperationRecord, OperationStatus,
};
pub use snapshot::StoreSnapshot;

use std::collections::HashSet;

use parking_lot::Mutex;
use serde::Deserialize;
use taskboard_proto::task::{
    MAX_DESCRIPTION_LENGTH, OwnerRef, Task, TaskDraft, TaskError, TaskId, TaskPatch,
    validate_description,
};
use tokio::sync::watch;

use crate::remote::{RemoteCollection, RemoteError};

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Input rejected before any remote call.
    #[error(transparent)]
    Validation(#[from] TaskError),

    /// The remote call failed; the local collection is unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Which side is trusted when reconciling a confirmed update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Reconcile {
    /// Merge the locally supplied patch. Works against services that
    /// acknowledge updates without persisting them.
    #[default]
    #[serde(rename = "patch")]
    TrustPatch,
    /// Merge the server's representation when the acknowledgement carries
    /// one, falling back to the patch.
    #[serde(rename = "server")]
    TrustServer,
}

/// Store tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reconciliation source for updates.
    pub reconcile: Reconcile,
    /// Maximum description length in characters.
    pub max_description_len: usize,
    /// Number of finished operations kept in the history.
    pub operation_history: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            reconcile: Reconcile::default(),
            max_description_len: MAX_DESCRIPTION_LENGTH,
            operation_history: 32,
        }
    }
}

struct StoreState {
    tasks: Vec<Task>,
    lifecycle: Lifecycle,
    last_error: Option<String>,
    loads_in_flight: usize,
    operations: OperationLog,
    /// Ids created by this session since the last load.
    created: HashSet<TaskId>,
    /// Bumped by `clear()`; resolutions from an older epoch are dropped.
    epoch: u64,
}

impl StoreState {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tasks: self.tasks.clone(),
            lifecycle: self.lifecycle,
            last_error: self.last_error.clone(),
            operations: self.operations.to_vec(),
        }
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Appends a created task. A returned id that is already held may only
    /// replace an entry this session created itself; any other collision
    /// leaves the collection unchanged and is reported as an error.
    fn insert_created(&mut self, task: Task) -> Result<(), RemoteError> {
        match self.position(task.id) {
            Some(pos) if self.created.contains(&task.id) => {
                tracing::debug!(id = %task.id, "server reused an id created this session, replacing entry");
                self.tasks[pos] = task;
            }
            Some(_) => {
                tracing::warn!(id = %task.id, "server returned an id held by another task");
                return Err(RemoteError::Decode(format!(
                    "server returned id {} already held",
                    task.id
                )));
            }
            None => {
                self.created.insert(task.id);
                self.tasks.push(task);
            }
        }
        Ok(())
    }
}

/// Removes later duplicates, keeping the first occurrence of each id.
fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks.into_iter().filter(|t| seen.insert(t.id)).collect()
}

/// Local mirror of a remote task collection.
pub struct TaskStore<R> {
    remote: R,
    options: StoreOptions,
    state: Mutex<StoreState>,
    tx: watch::Sender<StoreSnapshot>,
}

impl<R: RemoteCollection> TaskStore<R> {
    /// Creates an empty store with default options.
    pub fn new(remote: R) -> Self {
        Self::with_options(remote, StoreOptions::default())
    }

    /// Creates an empty store.
    pub fn with_options(remote: R, options: StoreOptions) -> Self {
        let state = StoreState {
            tasks: Vec::new(),
            lifecycle: Lifecycle::Idle,
            last_error: None,
            loads_in_flight: 0,
            operations: OperationLog::new(options.operation_history),
            created: HashSet::new(),
            epoch: 0,
        };
        let (tx, _rx) = watch::channel(state.snapshot());
        Self {
            remote,
            options,
            state: Mutex::new(state),
            tx,
        }
    }

    /// Returns the remote this store talks to.
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the store options.
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Subscribes to snapshots. The receiver starts at the current one.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.tx.borrow().clone()
    }

    /// Total number of tasks.
    pub fn count(&self) -> usize {
        self.tx.borrow().count()
    }

    /// Number of completed tasks.
    pub fn count_completed(&self) -> usize {
        self.tx.borrow().count_completed()
    }

    /// Number of tasks not yet completed.
    pub fn count_pending(&self) -> usize {
        self.tx.borrow().count_pending()
    }

    /// Looks up a task by id.
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.tx.borrow().get(id).cloned()
    }

    fn publish(&self, state: &StoreState) {
        self.tx.send_replace(state.snapshot());
    }

    /// Fetches the whole collection and replaces the local copy.
    ///
    /// Concurrent loads are not coalesced: each result is applied as it
    /// resolves, so the collection ends up reflecting the last load to
    /// resolve. The lifecycle stays [`Lifecycle::Loading`] while any load
    /// is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Remote`] if the fetch fails. The local
    /// collection is left untouched.
    pub async fn load(&self) -> Result<usize, StoreError> {
        let epoch = {
            let mut state = self.state.lock();
            state.loads_in_flight += 1;
            state.lifecycle = Lifecycle::Loading;
            self.publish(&state);
            state.epoch
        };

        let result = self.remote.list_all().await;

        let mut state = self.state.lock();
        if state.epoch != epoch {
            tracing::debug!("load resolved after clear, dropping result");
            return result.map(|t| t.len()).map_err(StoreError::from);
        }
        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
        let still_loading = state.loads_in_flight > 0;

        let outcome = match result {
            Ok(tasks) => {
                state.tasks = dedup_by_id(tasks);
                state.created.clear();
                let count = state.tasks.len();
                tracing::info!(count, "tasks loaded");
                state.lifecycle = if still_loading {
                    Lifecycle::Loading
                } else {
                    Lifecycle::Succeeded
                };
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "task load failed");
                state.last_error = Some(err.to_string());
                state.lifecycle = if still_loading {
                    Lifecycle::Loading
                } else {
                    Lifecycle::Failed
                };
                Err(StoreError::Remote(err))
            }
        };
        self.publish(&state);
        drop(state);
        outcome
    }

    /// Creates a task and appends the server's copy once confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an empty or overlong
    /// description (no remote call is made) and [`StoreError::Remote`] if
    /// the create fails.
    pub async fn add_task(&self, description: &str, owner: OwnerRef) -> Result<Task, StoreError> {
        validate_description(description, self.options.max_description_len)?;
        let draft = TaskDraft::new(description, owner);

        let (op, epoch) = self.begin(OperationKind::Create, None);
        let result = self.remote.create(&draft).await;

        let mut state = self.state.lock();
        let current = state.epoch == epoch;
        let outcome = match result {
            Ok(task) => {
                let inserted = if current {
                    state.insert_created(task.clone())
                } else {
                    Ok(())
                };
                match inserted {
                    Ok(()) => {
                        tracing::info!(id = %task.id, "task created");
                        state.operations.finish(op, Some(task.id), None);
                        Ok(task)
                    }
                    Err(err) => {
                        state.last_error = Some(err.to_string());
                        state.operations.finish(op, Some(task.id), Some(err.to_string()));
                        Err(StoreError::Remote(err))
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "task create failed");
                if current {
                    state.last_error = Some(err.to_string());
                }
                state.operations.finish(op, None, Some(err.to_string()));
                Err(StoreError::Remote(err))
            }
        };
        self.publish(&state);
        drop(state);
        outcome
    }

    /// Sets the completion flag of a task.
    ///
    /// # Errors
    ///
    /// See [`TaskStore::edit_task`].
    pub async fn set_completed(
        &self,
        id: TaskId,
        completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        self.edit_task(id, TaskPatch::completed(completed)).await
    }

    /// Patches a task and merges the change once the server confirms it.
    ///
    /// Returns the updated local task, or `None` when no local task has
    /// the id (the confirmation is then ignored).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an empty patch or an invalid
    /// description (no remote call is made) and [`StoreError::Remote`] if
    /// the update fails.
    pub async fn edit_task(
        &self,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError> {
        patch.validate(self.options.max_description_len)?;

        let (op, epoch) = self.begin(OperationKind::Update, Some(id));
        let result = self.remote.update(id, &patch).await;

        let mut state = self.state.lock();
        let current = state.epoch == epoch;
        let outcome = match result {
            Ok(ack) => {
                let reconcile = self.options.reconcile;
                let updated = if current {
                    state.tasks.iter_mut().find(|t| t.id == id).map(|task| {
                        match (reconcile, ack) {
                            (Reconcile::TrustServer, Some(server)) => {
                                task.description = server.description;
                                task.completed = server.completed;
                            }
                            _ => task.apply(&patch),
                        }
                        task.clone()
                    })
                } else {
                    None
                };
                if updated.is_none() {
                    tracing::debug!(%id, "update confirmed for a task no longer held locally");
                }
                state.operations.finish(op, None, None);
                Ok(updated)
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "task update failed");
                if current {
                    state.last_error = Some(err.to_string());
                }
                state.operations.finish(op, None, Some(err.to_string()));
                Err(StoreError::Remote(err))
            }
        };
        self.publish(&state);
        drop(state);
        outcome
    }

    /// Deletes a task and drops it locally once the server confirms.
    ///
    /// Returns `true` if a local task was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Remote`] if the delete fails. The local
    /// collection is left untouched.
    pub async fn remove_task(&self, id: TaskId) -> Result<bool, StoreError> {
        let (op, epoch) = self.begin(OperationKind::Remove, Some(id));
        let result = self.remote.remove(id).await;

        let mut state = self.state.lock();
        let current = state.epoch == epoch;
        let outcome = match result {
            Ok(()) => {
                let before = state.tasks.len();
                if current {
                    state.tasks.retain(|t| t.id != id);
                    state.created.remove(&id);
                }
                let removed = state.tasks.len() < before;
                if removed {
                    tracing::info!(%id, "task removed");
                } else {
                    tracing::debug!(%id, "delete confirmed for a task not held locally");
                }
                state.operations.finish(op, None, None);
                Ok(removed)
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "task remove failed");
                if current {
                    state.last_error = Some(err.to_string());
                }
                state.operations.finish(op, None, Some(err.to_string()));
                Err(StoreError::Remote(err))
            }
        };
        self.publish(&state);
        drop(state);
        outcome
    }

    /// Clears the collection, lifecycle, error and history (logout).
    ///
    /// Calls still in flight resolve without touching the cleared state.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.tasks.clear();
        state.lifecycle = Lifecycle::Idle;
        state.last_error = None;
        state.loads_in_flight = 0;
        state.operations.clear();
        state.created.clear();
        state.epoch += 1;
        tracing::info!("store cleared");
        self.publish(&state);
    }

    /// Clears the last recorded error.
    pub fn dismiss_error(&self) {
        let mut state = self.state.lock();
        if state.last_error.take().is_some() {
            self.publish(&state);
        }
    }

    fn begin(&self, kind: OperationKind, target: Option<TaskId>) -> (OperationId, u64) {
        let mut state = self.state.lock();
        let op = state.operations.begin(kind, target);
        tracing::debug!(%op, %kind, "operation started");
        self.publish(&state);
        (op, state.epoch)
    }
}
