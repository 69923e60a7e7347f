//! HTTP implementation of [`RemoteCollection`].
//!
//! Speaks the todo service's JSON API:
//!
//! | Call | Request | Response |
//! |---|---|---|
//! | `list_all` | `GET /todos` | `{ "todos": [...] }` |
//! | `create` | `POST /todos/add` | created task |
//! | `update` | `PUT /todos/{id}` | acknowledgement (may be partial) |
//! | `remove` | `DELETE /todos/{id}` | acknowledgement |

use reqwest::{Client, Response, StatusCode};
use taskboard_proto::task::{Task, TaskDraft, TaskId, TaskPatch};
use taskboard_proto::wire::{self, ErrorBody, TodoList};
use url::Url;

use super::{RemoteCollection, RemoteError};

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// [`RemoteCollection`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base: Url,
}

impl HttpRemote {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// A base with a path (e.g. `http://host/api`) is treated as a
    /// directory, so endpoints resolve to `http://host/api/todos`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] if `base_url` does not parse or
    /// cannot be a base.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a remote reusing an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] for an unusable base URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, RemoteError> {
        let mut base = Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(format!(
                "{base_url} cannot be used as a base"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|e| RemoteError::InvalidUrl(e.to_string()))
    }

    fn todo_endpoint(&self, id: TaskId) -> Result<Url, RemoteError> {
        self.endpoint(&format!("todos/{id}"))
    }
}

/// Reads the body, mapping non-success statuses to errors.
///
/// A 404 on a per-task endpoint becomes [`RemoteError::NotFound`].
async fn read_body(response: Response, id: Option<TaskId>) -> Result<Vec<u8>, RemoteError> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;

    if status == StatusCode::NOT_FOUND
        && let Some(id) = id
    {
        return Err(RemoteError::NotFound(id));
    }
    if !status.is_success() {
        let message = wire::decode::<ErrorBody>(&body).map_or_else(
            |_| String::from_utf8_lossy(&body).into_owned(),
            |b| b.message,
        );
        return Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body.to_vec())
}

#[allow(clippy::needless_pass_by_value)]
fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}

impl RemoteCollection for HttpRemote {
    async fn list_all(&self) -> Result<Vec<Task>, RemoteError> {
        let url = self.endpoint("todos")?;
        tracing::debug!(%url, "GET todos");
        let response = self.client.get(url).send().await.map_err(transport)?;
        let body = read_body(response, None).await?;
        let list: TodoList =
            wire::decode(&body).map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(list.todos)
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, RemoteError> {
        let url = self.endpoint("todos/add")?;
        tracing::debug!(%url, "POST todo");
        let response = self
            .client
            .post(url)
            .json(draft)
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response, None).await?;
        wire::decode(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Option<Task>, RemoteError> {
        let url = self.todo_endpoint(id)?;
        tracing::debug!(%url, "PUT todo");
        let response = self
            .client
            .put(url)
            .json(patch)
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response, Some(id)).await?;
        Ok(wire::decode_update_ack(&body))
    }

    async fn remove(&self, id: TaskId) -> Result<(), RemoteError> {
        let url = self.todo_endpoint(id)?;
        tracing::debug!(%url, "DELETE todo");
        let response = self.client.delete(url).send().await.map_err(transport)?;
        read_body(response, Some(id)).await?;
        Ok(())
    }
}
