//! In-memory todo list behind the REST endpoints.
//!
//! By default writes are answered but not persisted, like the public demo
//! service: a create returns a task with the next free id (the same one on
//! every call, since nothing is stored), an update returns
//! the merged task and a delete returns the task flagged as deleted, while
//! the stored list stays unchanged. With `persist_writes` every write is
//! applied to the list.

use taskboard_proto::demo::demo_tasks;
use taskboard_proto::task::{Task, TaskDraft, TaskId, TaskPatch};
use tokio::sync::RwLock;

struct TodoList {
    todos: Vec<Task>,
    /// Next id handed out by a create.
    next_id: u64,
}

/// Thread-safe todo list.
///
/// Thread-safe via [`RwLock`]; the guard is never held across an await.
pub struct TodoStore {
    inner: RwLock<TodoList>,
    persist_writes: bool,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new(Vec::new(), false)
    }
}

impl TodoStore {
    /// Creates a store holding `todos` in the given order.
    #[must_use]
    pub fn new(todos: Vec<Task>, persist_writes: bool) -> Self {
        let next_id = todos.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(TodoList { todos, next_id }),
            persist_writes,
        }
    }

    /// Creates a store seeded with the demo collection.
    #[must_use]
    pub fn with_demo_tasks(persist_writes: bool) -> Self {
        Self::new(demo_tasks(), persist_writes)
    }

    /// Whether writes change the stored list.
    #[must_use]
    pub const fn persist_writes(&self) -> bool {
        self.persist_writes
    }

    /// Returns every todo in server order.
    pub async fn list(&self) -> Vec<Task> {
        self.inner.read().await.todos.clone()
    }

    /// Returns one todo.
    pub async fn get(&self, id: TaskId) -> Option<Task> {
        self.inner
            .read()
            .await
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Creates a todo and returns it with its assigned id.
    pub async fn create(&self, draft: TaskDraft) -> Task {
        let mut list = self.inner.write().await;
        let task = draft.into_task(TaskId::new(list.next_id));
        if self.persist_writes {
            list.next_id += 1;
            list.todos.push(task.clone());
        }
        task
    }

    /// Merges `patch` into a todo and returns the result, or `None` if the
    /// id is unknown.
    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Option<Task> {
        let mut list = self.inner.write().await;
        let task = list.todos.iter_mut().find(|t| t.id == id)?;
        if self.persist_writes {
            task.apply(patch);
            Some(task.clone())
        } else {
            let mut merged = task.clone();
            merged.apply(patch);
            Some(merged)
        }
    }

    /// Removes a todo and returns it, or `None` if the id is unknown.
    pub async fn remove(&self, id: TaskId) -> Option<Task> {
        let mut list = self.inner.write().await;
        let pos = list.todos.iter().position(|t| t.id == id)?;
        if self.persist_writes {
            Some(list.todos.remove(pos))
        } else {
            Some(list.todos[pos].clone())
        }
    }
}
