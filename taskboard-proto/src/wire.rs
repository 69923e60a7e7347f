//! JSON bodies exchanged with the todo service.
//!
//! Only the `todos` field of the list envelope is meaningful to the
//! client; paging fields are carried so the demo server can emit them.

use serde::{Deserialize, Serialize};

use crate::task::{OwnerRef, Task, TaskId};

/// Errors from encoding or decoding wire bodies.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The body could not be serialized or deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Response of `GET /todos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// The collection, in server order.
    pub todos: Vec<Task>,
    /// Total number of todos on the server.
    #[serde(default)]
    pub total: usize,
    /// Offset of the first returned todo.
    #[serde(default)]
    pub skip: usize,
    /// Page size used by the server.
    #[serde(default)]
    pub limit: usize,
}

impl TodoList {
    /// Wraps a full collection as a single page.
    #[must_use]
    pub fn full(todos: Vec<Task>) -> Self {
        let total = todos.len();
        Self {
            todos,
            total,
            skip: 0,
            limit: total,
        }
    }
}

/// Response of `DELETE /todos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTask {
    /// Id of the removed task.
    pub id: TaskId,
    /// Description at deletion time.
    #[serde(rename = "todo")]
    pub description: String,
    /// Completion flag at deletion time.
    pub completed: bool,
    /// Owning user.
    #[serde(rename = "userId")]
    pub owner: OwnerRef,
    /// Always `true`.
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
    /// RFC 3339 deletion timestamp.
    #[serde(rename = "deletedOn")]
    pub deleted_on: String,
}

impl DeletedTask {
    /// Builds the acknowledgement for a removed task.
    #[must_use]
    pub fn from_task(task: Task, deleted_on: String) -> Self {
        Self {
            id: task.id,
            description: task.description,
            completed: task.completed,
            owner: task.owner,
            is_deleted: true,
            deleted_on,
        }
    }
}

/// Error body returned by the service on 4xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub message: String,
}

/// Serializes any wire body to a JSON string.
///
/// # Errors
///
/// Returns [`WireError::Json`] if serialization fails.
pub fn encode<T: Serialize>(body: &T) -> Result<String, WireError> {
    Ok(serde_json::to_string(body)?)
}

/// Parses a wire body from JSON bytes.
///
/// # Errors
///
/// Returns [`WireError::Json`] if the bytes are not valid JSON for `T`.
pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, WireError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Parses an update acknowledgement. Empty bodies and bodies that are not
/// a full task representation yield `None`.
#[must_use]
pub fn decode_update_ack(bytes: &[u8]) -> Option<Task> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}
