//! End-to-end board flow: key events drive the app, commands run through
//! the worker against an in-memory remote, and the app re-reads store
//! snapshots the way the TUI loop does.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard::app::{App, Column, Level, Modal, Screen};
use taskboard::config::ClientConfig;
use taskboard::login::Captcha;
use taskboard::remote::memory::InMemoryRemote;
use taskboard::remote::{RemoteError, RemoteOp};
use taskboard::store::{StoreSnapshot, TaskStore};
use taskboard::worker::{BoardCommand, BoardEvent, spawn_worker};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    app: App,
    store: Arc<TaskStore<InMemoryRemote>>,
    cmd_tx: mpsc::Sender<BoardCommand>,
    evt_rx: mpsc::Receiver<BoardEvent>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(TaskStore::new(InMemoryRemote::with_demo_tasks()));
        let (cmd_tx, evt_rx) = spawn_worker(Arc::clone(&store), 16);
        let mut app = App::new(&ClientConfig::default());
        app.captcha = Captcha::from_text("Zx9Qw2");
        Self {
            app,
            store,
            cmd_tx,
            evt_rx,
        }
    }

    /// Feeds a key to the app and forwards any resulting command.
    async fn press(&mut self, code: KeyCode) -> Option<BoardCommand> {
        let snapshot = self.store.snapshot();
        let cmd = self
            .app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), &snapshot);
        if let Some(cmd) = cmd.clone() {
            self.cmd_tx.send(cmd).await.unwrap();
        }
        cmd
    }

    async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
    }

    /// Waits for the next worker event and hands it to the app.
    async fn next_event(&mut self) -> BoardEvent {
        let event = self.evt_rx.recv().await.expect("worker alive");
        self.app.apply_event(event.clone(), Instant::now());
        event
    }

    fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    async fn login(&mut self) {
        self.type_text("emilys").await;
        self.press(KeyCode::Tab).await;
        self.type_text("emilyspass").await;
        self.press(KeyCode::Tab).await;
        self.type_text("Zx9Qw2").await;
        assert_eq!(self.press(KeyCode::Enter).await, Some(BoardCommand::Load));
        assert_eq!(self.next_event().await, BoardEvent::Loaded { count: 6 });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_loads_board() {
    let mut h = Harness::new();
    h.login().await;

    assert_eq!(h.app.screen, Screen::Board);
    assert_eq!(h.app.session.as_ref().unwrap().identifier, "emilys");
    assert!(h.app.last_synced.is_some());
    let snapshot = h.snapshot();
    assert_eq!(snapshot.filter_by_status(false).len(), 4);
    assert_eq!(snapshot.filter_by_status(true).len(), 2);
}

#[tokio::test]
async fn wrong_captcha_stays_on_login() {
    let mut h = Harness::new();
    h.type_text("emilys").await;
    h.press(KeyCode::Tab).await;
    h.type_text("pw").await;
    h.press(KeyCode::Tab).await;
    h.type_text("zx9qw2").await;

    assert_eq!(h.press(KeyCode::Enter).await, None);
    assert_eq!(h.app.screen, Screen::Login);
    assert_eq!(h.app.login_error.as_deref(), Some("Captcha not matched"));
    assert_ne!(h.app.captcha.text(), "Zx9Qw2");
    assert_eq!(h.store.remote().calls(RemoteOp::List), 0);
}

#[tokio::test]
async fn add_toggle_edit_delete() {
    let mut h = Harness::new();
    h.login().await;

    // Add.
    h.press(KeyCode::Char('a')).await;
    h.type_text("water the plants").await;
    h.press(KeyCode::Enter).await;
    let BoardEvent::Added(created) = h.next_event().await else {
        panic!("expected Added");
    };
    assert_eq!(created.description, "water the plants");
    assert_eq!(h.snapshot().filter_by_status(false).len(), 5);

    // Select it (last incomplete row) and mark it done.
    for _ in 0..4 {
        h.press(KeyCode::Down).await;
    }
    assert_eq!(h.app.selected_task(&h.snapshot()), Some(&created));
    h.press(KeyCode::Char(' ')).await;
    assert!(matches!(
        h.next_event().await,
        BoardEvent::Updated { task: Some(ref t), .. } if t.completed
    ));
    assert_eq!(h.snapshot().filter_by_status(true).len(), 3);

    // Edit it from the completed column; only the description changes.
    h.press(KeyCode::Right).await;
    assert_eq!(h.app.column, Column::Completed);
    h.press(KeyCode::Down).await;
    h.press(KeyCode::Down).await;
    h.press(KeyCode::Char('e')).await;
    assert!(matches!(h.app.modal, Some(Modal::EditTask { .. })));
    h.type_text(" daily").await;
    let cmd = h.press(KeyCode::Enter).await;
    let Some(BoardCommand::Edit { patch, .. }) = cmd else {
        panic!("expected Edit");
    };
    assert_eq!(patch.description.as_deref(), Some("water the plants daily"));
    assert_eq!(patch.completed, None);
    h.next_event().await;
    assert_eq!(
        h.store.get(created.id).unwrap().description,
        "water the plants daily"
    );

    // Delete with confirmation.
    h.press(KeyCode::Char('d')).await;
    assert_eq!(
        h.press(KeyCode::Char('y')).await,
        Some(BoardCommand::Remove { id: created.id })
    );
    assert_eq!(
        h.next_event().await,
        BoardEvent::Removed { id: created.id }
    );
    assert_eq!(h.snapshot().count(), 6);
    assert_eq!(
        h.app.current_notification().map(|n| n.message.as_str()),
        Some("Task deleted")
    );
}

#[tokio::test]
async fn failures_become_error_notifications() {
    let mut h = Harness::new();
    h.login().await;
    h.store
        .remote()
        .fail_next(RemoteOp::Update, RemoteError::Unavailable);

    h.press(KeyCode::Char('t')).await;
    assert!(matches!(
        h.next_event().await,
        BoardEvent::Failed { action: "update", .. }
    ));

    let note = h.app.current_notification().unwrap();
    assert_eq!(note.level, Level::Error);
    assert_eq!(note.message, "Could not update task: remote unavailable");
    assert_eq!(
        h.snapshot().last_error.as_deref(),
        Some("remote unavailable")
    );
    assert_eq!(h.snapshot().filter_by_status(true).len(), 2);

    h.press(KeyCode::Char('x')).await;
    let mut rx = h.store.subscribe();
    rx.wait_for(|s| s.last_error.is_none()).await.unwrap();
}

#[tokio::test]
async fn logout_clears_store() {
    let mut h = Harness::new();
    h.login().await;

    assert_eq!(h.press(KeyCode::Char('o')).await, Some(BoardCommand::Clear));
    assert_eq!(h.app.screen, Screen::Login);
    assert!(h.app.session.is_none());

    let mut rx = h.store.subscribe();
    let snapshot = rx.wait_for(|s| s.tasks.is_empty()).await.unwrap().clone();
    assert_eq!(snapshot, StoreSnapshot::default());
}
