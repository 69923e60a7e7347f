//! Task model for the remote todo collection.
//!
//! Field names on the wire follow the todo service (`todo`, `userId`);
//! the Rust side uses `description` and `owner`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum allowed task description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 256;

/// Server-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the user owning a task. Set once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerRef(u64);

impl OwnerRef {
    /// Wraps a raw owner reference.
    #[must_use]
    pub const fn new(owner: u64) -> Self {
        Self(owner)
    }

    /// Returns the raw owner reference.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for task input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task description cannot be empty.
    #[error("task description cannot be empty")]
    DescriptionEmpty,
    /// Task description exceeds the maximum length.
    #[error("task description too long (max {max} characters)")]
    DescriptionTooLong {
        /// Configured limit.
        max: usize,
    },
    /// A patch must change at least one field.
    #[error("task patch has no fields")]
    EmptyPatch,
}

/// Checks a description against the non-empty and length rules.
///
/// Length is counted in characters, not bytes. Whitespace-only input is
/// rejected as empty.
///
/// # Errors
///
/// Returns [`TaskError::DescriptionEmpty`] or
/// [`TaskError::DescriptionTooLong`].
pub fn validate_description(description: &str, max: usize) -> Result<(), TaskError> {
    if description.trim().is_empty() {
        return Err(TaskError::DescriptionEmpty);
    }
    if description.chars().count() > max {
        return Err(TaskError::DescriptionTooLong { max });
    }
    Ok(())
}

/// One task record in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier, stable for the task's lifetime.
    pub id: TaskId,
    /// Free-text description.
    #[serde(rename = "todo")]
    pub description: String,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
    /// Owning user.
    #[serde(rename = "userId")]
    pub owner: OwnerRef,
}

impl Task {
    /// Field-merges `patch` into this task. Fields absent from the patch
    /// are preserved; `id` and `owner` never change.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// A task that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Free-text description.
    #[serde(rename = "todo")]
    pub description: String,
    /// Always `false` for new tasks created through the store.
    #[serde(default)]
    pub completed: bool,
    /// Owning user.
    #[serde(rename = "userId")]
    pub owner: OwnerRef,
}

impl TaskDraft {
    /// Creates an open draft for the given owner.
    #[must_use]
    pub fn new(description: impl Into<String>, owner: OwnerRef) -> Self {
        Self {
            description: description.into(),
            completed: false,
            owner,
        }
    }

    /// Builds the task the server would return for this draft.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            description: self.description,
            completed: self.completed,
            owner: self.owner,
        }
    }
}

/// Partial update of a task's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New description, if changing.
    #[serde(rename = "todo", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion flag, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only sets the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            description: None,
            completed: Some(completed),
        }
    }

    /// Patch that only replaces the description.
    #[must_use]
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            completed: None,
        }
    }

    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }

    /// Rejects empty patches and invalid descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::EmptyPatch`] or a description error.
    pub fn validate(&self, max_description: usize) -> Result<(), TaskError> {
        if self.is_empty() {
            return Err(TaskError::EmptyPatch);
        }
        if let Some(description) = &self.description {
            validate_description(description, max_description)?;
        }
        Ok(())
    }
}
