//! Read-only view of the store handed to subscribers.

use taskboard_proto::task::{Task, TaskId};

use super::lifecycle::{Lifecycle, OperationRecord};

/// Immutable copy of the store state at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// The collection, in display order.
    pub tasks: Vec<Task>,
    /// Status of the latest load.
    pub lifecycle: Lifecycle,
    /// Message of the latest failed remote call, until dismissed.
    pub last_error: Option<String>,
    /// Recent mutating operations, oldest first.
    pub operations: Vec<OperationRecord>,
}

impl StoreSnapshot {
    /// Total number of tasks.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of completed tasks.
    #[must_use]
    pub fn count_completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Number of tasks not yet completed.
    #[must_use]
    pub fn count_pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Tasks with the given completion flag, in collection order.
    #[must_use]
    pub fn filter_by_status(&self, completed: bool) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.completed == completed)
            .collect()
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of mutations still in flight.
    #[must_use]
    pub fn pending_operations(&self) -> usize {
        self.operations.iter().filter(|r| r.is_pending()).count()
    }

    /// Returns `true` while a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lifecycle == Lifecycle::Loading
    }
}
