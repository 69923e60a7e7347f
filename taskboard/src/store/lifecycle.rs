//! Request lifecycle tracking.
//!
//! The list-fetch has one global [`Lifecycle`]. Mutations are tracked
//! individually in a bounded [`OperationLog`] so their failures never show
//! up as a failed load.

use std::collections::VecDeque;
use std::fmt;

use taskboard_proto::task::TaskId;
use uuid::Uuid;

/// Status of the most recent full-collection load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// No load issued yet (or the store was cleared).
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
    /// The last load to resolve succeeded.
    Succeeded,
    /// The last load to resolve failed.
    Failed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Identifier of one mutating operation (UUID v7, time-ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Creates a fresh operation id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// `add_task`.
    Create,
    /// `edit_task` / `set_completed`.
    Update,
    /// `remove_task`.
    Remove,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Status of one mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// Remote call in flight.
    Pending,
    /// Remote confirmed; local state reconciled.
    Succeeded,
    /// Remote call failed with the given message.
    Failed(String),
}

/// One entry in the operation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// Operation identifier.
    pub id: OperationId,
    /// What the operation does.
    pub kind: OperationKind,
    /// Target task; `None` for creates until the server assigns an id.
    pub target: Option<TaskId>,
    /// Current status.
    pub status: OperationStatus,
}

impl OperationRecord {
    /// Returns `true` while the remote call is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, OperationStatus::Pending)
    }
}

/// Bounded history of mutating operations, oldest first.
///
/// Pending records are never evicted; when the log is full the oldest
/// finished record makes room.
#[derive(Debug, Clone)]
pub struct OperationLog {
    records: VecDeque<OperationRecord>,
    capacity: usize,
}

impl OperationLog {
    /// Creates a log keeping at most `capacity` finished records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
        }
    }

    /// Records a new pending operation.
    pub fn begin(&mut self, kind: OperationKind, target: Option<TaskId>) -> OperationId {
        let id = OperationId::new();
        self.records.push_back(OperationRecord {
            id,
            kind,
            target,
            status: OperationStatus::Pending,
        });
        self.evict();
        id
    }

    /// Marks an operation finished. Unknown ids are ignored (the log may
    /// have been cleared while the call was in flight).
    pub fn finish(&mut self, id: OperationId, target: Option<TaskId>, error: Option<String>) {
        if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
            if target.is_some() {
                record.target = target;
            }
            record.status = error.map_or(OperationStatus::Succeeded, OperationStatus::Failed);
        }
        self.evict();
    }

    /// Number of operations still in flight.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.records.iter().filter(|r| r.is_pending()).count()
    }

    /// Copies the history, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<OperationRecord> {
        self.records.iter().cloned().collect()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn evict(&mut self) {
        while self.records.len() > self.capacity {
            let Some(pos) = self.records.iter().position(|r| !r.is_pending()) else {
                break;
            };
            self.records.remove(pos);
        }
    }
}
