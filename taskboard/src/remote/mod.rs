//! Remote collection client abstraction for `Taskboard`.
//!
//! Defines the [`RemoteCollection`] trait the task store depends on.
//! Implementations:
//! - [`http::HttpRemote`]: JSON over HTTP against the todo service
//! - [`memory::InMemoryRemote`]: in-process collection for tests and offline mode
//!
//! The client is a thin pass-through: no caching, no retries, no timeouts.
//! A failure is reported once and recovery belongs to the caller.

pub mod http;
pub mod memory;

use std::fmt;

use taskboard_proto::task::{Task, TaskDraft, TaskId, TaskPatch};

/// Which remote operation a call performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    /// Fetch the whole collection.
    List,
    /// Create a task.
    Create,
    /// Patch a task.
    Update,
    /// Delete a task.
    Remove,
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Errors that can occur during remote calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message or raw body.
        message: String,
    },

    /// The response body was not what the endpoint promises.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The server does not know the task.
    #[error("task {0} not found on server")]
    NotFound(TaskId),

    /// The remote is unreachable.
    #[error("remote unavailable")]
    Unavailable,

    /// The base URL could not be used to build an endpoint.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

/// Async CRUD contract over a single remote collection.
///
/// Calls are independent: there is no implicit ordering between two
/// in-flight calls, and an implementation must not retry on its own.
pub trait RemoteCollection: Send + Sync {
    /// Fetch the full collection in server order.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, RemoteError>> + Send;

    /// Create a task. The returned id is server-assigned and may not be
    /// durable if the server fabricates responses.
    fn create(
        &self,
        draft: &TaskDraft,
    ) -> impl std::future::Future<Output = Result<Task, RemoteError>> + Send;

    /// Patch a task. Returns the server's representation when the
    /// acknowledgement carries one.
    fn update(
        &self,
        id: TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<Option<Task>, RemoteError>> + Send;

    /// Delete a task.
    fn remove(
        &self,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}

/// Runtime-selected remote: HTTP service or in-process collection.
pub enum AnyRemote {
    /// Talk to a todo service over HTTP.
    Http(http::HttpRemote),
    /// Work against an in-process collection.
    Memory(memory::InMemoryRemote),
}

impl AnyRemote {
    /// Short label for the status bar.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Http(_) => "HTTP",
            Self::Memory(_) => "Offline",
        }
    }
}

impl RemoteCollection for AnyRemote {
    async fn list_all(&self) -> Result<Vec<Task>, RemoteError> {
        match self {
            Self::Http(r) => r.list_all().await,
            Self::Memory(r) => r.list_all().await,
        }
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, RemoteError> {
        match self {
            Self::Http(r) => r.create(draft).await,
            Self::Memory(r) => r.create(draft).await,
        }
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Option<Task>, RemoteError> {
        match self {
            Self::Http(r) => r.update(id, patch).await,
            Self::Memory(r) => r.update(id, patch).await,
        }
    }

    async fn remove(&self, id: TaskId) -> Result<(), RemoteError> {
        match self {
            Self::Http(r) => r.remove(id).await,
            Self::Memory(r) => r.remove(id).await,
        }
    }
}
