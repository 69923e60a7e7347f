//! Command worker wiring the TUI to the async task store.
//!
//! The TUI event loop is synchronous (crossterm poll-based). It sends
//! [`BoardCommand`]s to a background tokio task, which runs each store
//! operation as its own task and reports the outcome as a [`BoardEvent`].
//!
//! ```text
//! TUI (main thread)  ←── BoardEvent ───  worker + per-command tasks
//!                     ─── BoardCommand →
//! ```
//!
//! Collection state itself reaches the TUI through the store's snapshot
//! channel; events only carry outcomes worth a notification.

use std::sync::Arc;

use taskboard_proto::task::{OwnerRef, Task, TaskId, TaskPatch};
use tokio::sync::mpsc;

use crate::remote::RemoteCollection;
use crate::store::{StoreError, TaskStore};

/// Default channel capacity for commands and events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Commands sent from the TUI main loop to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    /// Fetch the whole collection.
    Load,
    /// Create a task.
    Add {
        /// Task description.
        description: String,
        /// Owner stamped on the task.
        owner: OwnerRef,
    },
    /// Set a task's completion flag.
    SetCompleted {
        /// Target task.
        id: TaskId,
        /// New flag value.
        completed: bool,
    },
    /// Patch a task.
    Edit {
        /// Target task.
        id: TaskId,
        /// Fields to change.
        patch: TaskPatch,
    },
    /// Delete a task.
    Remove {
        /// Target task.
        id: TaskId,
    },
    /// Clear the store's last error.
    DismissError,
    /// Clear the store (logout).
    Clear,
    /// Stop the worker.
    Shutdown,
}

/// Events sent from the worker to the TUI main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A load finished.
    Loaded {
        /// Number of tasks now held.
        count: usize,
    },
    /// A task was created.
    Added(Task),
    /// A task was updated; `None` if it is no longer held locally.
    Updated {
        /// Target task.
        id: TaskId,
        /// Local copy after the merge.
        task: Option<Task>,
    },
    /// A task was deleted.
    Removed {
        /// Target task.
        id: TaskId,
    },
    /// A command failed.
    Failed {
        /// What was attempted (`"load"`, `"add"`, `"update"`, `"remove"`).
        action: &'static str,
        /// Human-readable error.
        error: String,
    },
}

impl BoardEvent {
    fn failed(action: &'static str, err: &StoreError) -> Self {
        Self::Failed {
            action,
            error: err.to_string(),
        }
    }
}

/// Spawn the command worker and return its channel handles.
///
/// Must be called inside a tokio runtime.
pub fn spawn_worker<R>(
    store: Arc<TaskStore<R>>,
    capacity: usize,
) -> (mpsc::Sender<BoardCommand>, mpsc::Receiver<BoardEvent>)
where
    R: RemoteCollection + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<BoardCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<BoardEvent>(capacity);
    tokio::spawn(async move {
        command_handler(store, cmd_rx, evt_tx).await;
    });
    (cmd_tx, evt_rx)
}

/// Hands a command from the synchronous TUI loop to the worker.
///
/// `Clear` and `DismissError` only touch local state, so they are applied
/// to `store` right away and still take effect when the channel is full.
/// `Clear` is also queued when there is room, so remote commands queued
/// before it cannot repopulate the store afterwards.
///
/// # Errors
///
/// Returns the command if it had to be queued and the channel is full or
/// closed.
pub fn submit<R: RemoteCollection>(
    store: &TaskStore<R>,
    cmd_tx: &mpsc::Sender<BoardCommand>,
    cmd: BoardCommand,
) -> Result<(), mpsc::error::TrySendError<BoardCommand>> {
    match cmd {
        BoardCommand::Clear => {
            store.clear();
            if cmd_tx.try_send(BoardCommand::Clear).is_err() {
                tracing::debug!("command channel unavailable, store cleared directly");
            }
            Ok(())
        }
        BoardCommand::DismissError => {
            store.dismiss_error();
            Ok(())
        }
        cmd => cmd_tx.try_send(cmd),
    }
}

/// Background task: dispatch commands to the store.
///
/// Remote-backed commands each get their own task so a slow call never
/// blocks commands for other tasks.
async fn command_handler<R>(
    store: Arc<TaskStore<R>>,
    mut cmd_rx: mpsc::Receiver<BoardCommand>,
    evt_tx: mpsc::Sender<BoardEvent>,
) where
    R: RemoteCollection + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        tracing::debug!(?cmd, "board command");
        match cmd {
            BoardCommand::DismissError => store.dismiss_error(),
            BoardCommand::Clear => store.clear(),
            BoardCommand::Shutdown => {
                tracing::info!("board worker shutting down");
                break;
            }
            cmd => {
                let store = Arc::clone(&store);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    if let Some(event) = execute(&store, cmd).await {
                        // TUI gone; nothing to report to.
                        let _ = evt_tx.send(event).await;
                    }
                });
            }
        }
    }
}

async fn execute<R: RemoteCollection>(
    store: &TaskStore<R>,
    cmd: BoardCommand,
) -> Option<BoardEvent> {
    let event = match cmd {
        BoardCommand::Load => match store.load().await {
            Ok(count) => BoardEvent::Loaded { count },
            Err(e) => BoardEvent::failed("load", &e),
        },
        BoardCommand::Add { description, owner } => {
            match store.add_task(&description, owner).await {
                Ok(task) => BoardEvent::Added(task),
                Err(e) => BoardEvent::failed("add", &e),
            }
        }
        BoardCommand::SetCompleted { id, completed } => {
            match store.set_completed(id, completed).await {
                Ok(task) => BoardEvent::Updated { id, task },
                Err(e) => BoardEvent::failed("update", &e),
            }
        }
        BoardCommand::Edit { id, patch } => match store.edit_task(id, patch).await {
            Ok(task) => BoardEvent::Updated { id, task },
            Err(e) => BoardEvent::failed("update", &e),
        },
        BoardCommand::Remove { id } => match store.remove_task(id).await {
            Ok(_) => BoardEvent::Removed { id },
            Err(e) => BoardEvent::failed("remove", &e),
        },
        BoardCommand::DismissError | BoardCommand::Clear | BoardCommand::Shutdown => return None,
    };
    Some(event)
}
