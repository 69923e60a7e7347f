//! HTTP server exposing the todo endpoints.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /todos` | whole list as a single page |
//! | `GET /todos/{id}` | one todo |
//! | `POST /todos/add` | create (201) |
//! | `PUT /todos/{id}` | field merge |
//! | `DELETE /todos/{id}` | remove, acknowledged with `isDeleted` |
//!
//! Client errors are answered with `{"message": ...}` bodies.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::{SecondsFormat, Utc};
use taskboard_proto::task::{
    MAX_DESCRIPTION_LENGTH, Task, TaskDraft, TaskId, TaskPatch, validate_description,
};
use taskboard_proto::wire::{self, DeletedTask, ErrorBody, TodoList};

use crate::store::TodoStore;

/// Shared state for all handlers.
pub struct ServerState {
    /// The todo list.
    pub store: TodoStore,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(TodoStore::with_demo_tasks(false))
    }
}

impl ServerState {
    /// Wraps a store.
    #[must_use]
    pub const fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

/// Request-level failure mapped to a status and an [`ErrorBody`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed path or body.
    #[error("{0}")]
    BadRequest(String),
    /// Unknown todo id.
    #[error("Todo with id '{0}' not found")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse::<u64>()
        .map(TaskId::new)
        .map_err(|_| ApiError::BadRequest(format!("Invalid todo id '{raw}'")))
}

async fn list_todos(State(state): State<Arc<ServerState>>) -> Json<TodoList> {
    Json(TodoList::full(state.store.list().await))
}

async fn get_todo(
    State(state): State<Arc<ServerState>>,
    Path(raw): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&raw)?;
    state
        .store
        .get(id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound(raw))
}

async fn add_todo(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let draft: TaskDraft = wire::decode(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_description(&draft.description, MAX_DESCRIPTION_LENGTH)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let task = state.store.create(draft).await;
    tracing::info!(id = %task.id, persisted = state.store.persist_writes(), "todo created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_todo(
    State(state): State<Arc<ServerState>>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&raw)?;
    let patch: TaskPatch = wire::decode(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    patch
        .validate(MAX_DESCRIPTION_LENGTH)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let task = state
        .store
        .update(id, &patch)
        .await
        .ok_or(ApiError::NotFound(raw))?;
    tracing::info!(%id, "todo updated");
    Ok(Json(task))
}

async fn delete_todo(
    State(state): State<Arc<ServerState>>,
    Path(raw): Path<String>,
) -> Result<Json<DeletedTask>, ApiError> {
    let id = parse_id(&raw)?;
    let task = state
        .store
        .remove(id)
        .await
        .ok_or(ApiError::NotFound(raw))?;
    tracing::info!(%id, "todo deleted");
    let deleted_on = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    Ok(Json(DeletedTask::from_task(task, deleted_on)))
}

/// Builds the router over `state`.
pub fn router(state: Arc<ServerState>) -> axum::Router {
    axum::Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/add", post(add_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

/// Starts the server on `addr` with the demo collection and fabricated
/// writes.
///
/// Returns the bound address and a join handle for the server task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(ServerState::default())).await
}

/// Starts the server with a pre-configured [`ServerState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "todo server error");
        }
    });

    Ok((bound_addr, handle))
}
