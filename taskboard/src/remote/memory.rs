//! In-process remote collection.
//!
//! Backs the offline demo mode and the store tests. Behaves like the todo
//! service (server-assigned sequential ids, field-merge on update) and adds
//! knobs the real service does not have:
//!
//! - failure injection ([`InMemoryRemote::fail_next`], [`InMemoryRemote::set_offline`])
//! - fabricated creates that are never persisted ([`InMemoryRemote::set_fabricate`])
//! - strict id checking for update/remove ([`InMemoryRemote::set_strict_ids`])
//! - a forced next create id ([`InMemoryRemote::set_next_id`])
//! - per-call gates that hold a call until released ([`InMemoryRemote::hold_next`]),
//!   so tests can choose the order in which in-flight calls resolve.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use taskboard_proto::demo::demo_tasks;
use taskboard_proto::task::{Task, TaskDraft, TaskId, TaskPatch};
use tokio::sync::oneshot;

use super::{RemoteCollection, RemoteError, RemoteOp};

/// Releases one held call. Dropping the gate also releases it.
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    /// Lets the held call proceed.
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

#[derive(Default)]
struct MemoryState {
    tasks: Vec<Task>,
    next_id: u64,
    fabricate: bool,
    strict_ids: bool,
    offline: bool,
    failures: HashMap<RemoteOp, VecDeque<RemoteError>>,
    holds: HashMap<RemoteOp, VecDeque<oneshot::Receiver<()>>>,
    calls: HashMap<RemoteOp, usize>,
}

impl MemoryState {
    /// Records the call and returns the gate to wait on, if any.
    fn begin(&mut self, op: RemoteOp) -> Option<oneshot::Receiver<()>> {
        *self.calls.entry(op).or_default() += 1;
        self.holds.get_mut(&op).and_then(VecDeque::pop_front)
    }

    /// Returns the error this call must fail with, if any.
    fn injected_failure(&mut self, op: RemoteOp) -> Option<RemoteError> {
        if self.offline {
            return Some(RemoteError::Unavailable);
        }
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

/// [`RemoteCollection`] over an in-memory task list.
pub struct InMemoryRemote {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemote {
    /// Creates an empty remote. The first created task gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a remote holding `tasks` in the given order.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(MemoryState {
                tasks,
                next_id,
                ..MemoryState::default()
            }),
        }
    }

    /// Creates a remote seeded with the demo collection.
    #[must_use]
    pub fn with_demo_tasks() -> Self {
        Self::with_tasks(demo_tasks())
    }

    /// Replaces the server-side collection.
    pub fn set_tasks(&self, tasks: Vec<Task>) {
        let mut state = self.state.lock();
        let max = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0);
        state.next_id = state.next_id.max(max + 1);
        state.tasks = tasks;
    }

    /// Returns a copy of the server-side collection.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// When set, creates return a task but do not store it, and the id
    /// counter does not advance (like the demo todo service).
    pub fn set_fabricate(&self, fabricate: bool) {
        self.state.lock().fabricate = fabricate;
    }

    /// Sets the id the next create hands out, even if a stored task
    /// already has it.
    pub fn set_next_id(&self, id: u64) {
        self.state.lock().next_id = id;
    }

    /// When set, update/remove of an unknown id fail with
    /// [`RemoteError::NotFound`]; otherwise they are acknowledged.
    pub fn set_strict_ids(&self, strict: bool) {
        self.state.lock().strict_ids = strict;
    }

    /// When set, every call fails with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Makes the next call of `op` fail with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, op: RemoteOp, error: RemoteError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Holds the next not-yet-started call of `op` until the returned gate
    /// is released. Gates are assigned to calls in call order.
    #[must_use]
    pub fn hold_next(&self, op: RemoteOp) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.state.lock().holds.entry(op).or_default().push_back(rx);
        Gate(tx)
    }

    /// Number of calls made for `op` so far, including failed ones.
    #[must_use]
    pub fn calls(&self, op: RemoteOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Registers the call, waits on its gate, then checks injected failures.
    async fn enter(&self, op: RemoteOp) -> Result<(), RemoteError> {
        let gate = self.state.lock().begin(op);
        if let Some(gate) = gate {
            // A dropped gate releases the call as well.
            let _ = gate.await;
        }
        let failure = self.state.lock().injected_failure(op);
        match failure {
            Some(err) => {
                tracing::debug!(%op, error = %err, "injected remote failure");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl RemoteCollection for InMemoryRemote {
    async fn list_all(&self) -> Result<Vec<Task>, RemoteError> {
        self.enter(RemoteOp::List).await?;
        Ok(self.state.lock().tasks.clone())
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, RemoteError> {
        self.enter(RemoteOp::Create).await?;
        let mut state = self.state.lock();
        let task = draft.clone().into_task(TaskId::new(state.next_id));
        if !state.fabricate {
            state.next_id += 1;
            state.tasks.push(task.clone());
        }
        drop(state);
        Ok(task)
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Option<Task>, RemoteError> {
        self.enter(RemoteOp::Update).await?;
        let mut state = self.state.lock();
        let strict = state.strict_ids;
        match state.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.apply(patch);
                Ok(Some(task.clone()))
            }
            None if strict => Err(RemoteError::NotFound(id)),
            None => Ok(None),
        }
    }

    async fn remove(&self, id: TaskId) -> Result<(), RemoteError> {
        self.enter(RemoteOp::Remove).await?;
        let mut state = self.state.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.strict_ids && state.tasks.len() == before {
            return Err(RemoteError::NotFound(id));
        }
        drop(state);
        Ok(())
    }
}
