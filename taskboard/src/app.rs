//! Application state and event handling.
//!
//! The app owns transient UI state only: the login form, which column and
//! row are selected, the open modal, and pending notifications. Task data
//! always comes from the [`StoreSnapshot`] passed in by the event loop.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard_proto::task::{OwnerRef, Task, TaskId, TaskPatch};

use crate::config::ClientConfig;
use crate::login::{Captcha, LoginError, LoginField, LoginForm, Session};
use crate::store::StoreSnapshot;
use crate::worker::{BoardCommand, BoardEvent};

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Login form with captcha.
    Login,
    /// Task board.
    Board,
}

/// Board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Tasks not yet completed.
    Incomplete,
    /// Completed tasks.
    Completed,
}

impl Column {
    /// The completion flag of tasks in this column.
    #[must_use]
    pub const fn completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Column title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Incomplete => "Incomplete",
            Self::Completed => "Completed",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Incomplete => 0,
            Self::Completed => 1,
        }
    }

    const fn other(self) -> Self {
        match self {
            Self::Incomplete => Self::Completed,
            Self::Completed => Self::Incomplete,
        }
    }
}

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl TextInput {
    /// Creates an input holding `value` with the cursor at the end.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    /// Current text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in characters.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Applies an editing key. Returns `false` if the key is not an
    /// editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let at = self.byte_index();
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index();
                    self.value.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.value.chars().count() {
                    let at = self.byte_index();
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => return false,
        }
        true
    }
}

/// Open modal dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// New task form.
    AddTask {
        /// Description being typed.
        input: TextInput,
    },
    /// Edit form for an existing task.
    EditTask {
        /// Task being edited.
        id: TaskId,
        /// Description being typed.
        input: TextInput,
        /// Completion flag being edited.
        completed: bool,
        /// Values when the modal opened.
        original: Task,
    },
    /// Delete confirmation.
    ConfirmDelete {
        /// Task to delete.
        id: TaskId,
        /// Description shown in the prompt.
        description: String,
    },
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Something succeeded.
    Info,
    /// Something failed.
    Error,
}

/// Transient status-bar message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Text to show.
    pub message: String,
    /// Severity.
    pub level: Level,
    /// When the notification disappears.
    pub expires_at: Instant,
}

/// Main application state.
pub struct App {
    /// Current screen.
    pub screen: Screen,
    /// Login field inputs, indexed by [`LoginField::index`].
    pub login_inputs: [TextInput; 3],
    /// Focused login field.
    pub login_focus: LoginField,
    /// Current captcha challenge.
    pub captcha: Captcha,
    /// Validation error shown under the login form.
    pub login_error: Option<String>,
    /// Session of the logged-in user.
    pub session: Option<Session>,
    /// Focused board column.
    pub column: Column,
    /// Selected row per column.
    pub selected: [usize; 2],
    /// Open modal, if any.
    pub modal: Option<Modal>,
    /// Pending notifications, oldest first.
    pub notifications: VecDeque<Notification>,
    /// Wall-clock time of the last successful load ("HH:MM").
    pub last_synced: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    owner: OwnerRef,
    captcha_length: usize,
    notification_ttl: Duration,
}

impl App {
    /// Create a new application on the login screen.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            screen: Screen::Login,
            login_inputs: Default::default(),
            login_focus: LoginField::Identifier,
            captcha: Captcha::generate(config.captcha_length),
            login_error: None,
            session: None,
            column: Column::Incomplete,
            selected: [0, 0],
            modal: None,
            notifications: VecDeque::new(),
            last_synced: None,
            should_quit: false,
            owner: config.owner_ref,
            captcha_length: config.captcha_length,
            notification_ttl: config.notification_ttl,
        }
    }

    /// Handle a key event.
    ///
    /// Returns the command to send to the worker, if the key triggers one.
    pub fn handle_key_event(
        &mut self,
        key: KeyEvent,
        snapshot: &StoreSnapshot,
    ) -> Option<BoardCommand> {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return None;
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Board if self.modal.is_some() => self.handle_modal_key(key),
            Screen::Board => self.handle_board_key(key, snapshot),
        }
    }

    /// Handle key event on the login screen.
    fn handle_login_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => return self.submit_login(),
            KeyCode::Tab | KeyCode::Down => self.login_focus = self.login_focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.login_focus = self.login_focus.prev(),
            KeyCode::F(5) => self.regenerate_captcha(),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.regenerate_captcha();
            }
            _ => {
                self.login_inputs[self.login_focus.index()].handle_key(key);
            }
        }
        None
    }

    /// Input for one login field.
    #[must_use]
    pub fn login_input(&self, field: LoginField) -> &TextInput {
        &self.login_inputs[field.index()]
    }

    /// Current login form values.
    #[must_use]
    pub fn login_form(&self) -> LoginForm {
        LoginForm {
            identifier: self.login_input(LoginField::Identifier).value().to_string(),
            password: self.login_input(LoginField::Password).value().to_string(),
            captcha_input: self.login_input(LoginField::Captcha).value().to_string(),
        }
    }

    fn regenerate_captcha(&mut self) {
        self.captcha = Captcha::generate(self.captcha_length);
        self.login_inputs[LoginField::Captcha.index()] = TextInput::default();
    }

    /// Validate the login form; on success switch to the board and load.
    fn submit_login(&mut self) -> Option<BoardCommand> {
        match self.login_form().validate(&self.captcha) {
            Ok(session) => {
                tracing::info!(identifier = %session.identifier, "login successful");
                self.session = Some(session);
                self.screen = Screen::Board;
                self.login_error = None;
                self.login_inputs = Default::default();
                self.login_focus = LoginField::Identifier;
                self.notify("Login successful", Level::Info, Instant::now());
                Some(BoardCommand::Load)
            }
            Err(err) => {
                if err == LoginError::CaptchaMismatch {
                    self.regenerate_captcha();
                    self.login_focus = LoginField::Captcha;
                }
                self.login_error = Some(err.to_string());
                None
            }
        }
    }

    /// Drop the session and return to the login screen.
    fn logout(&mut self) -> BoardCommand {
        if let Some(session) = self.session.take() {
            tracing::info!(identifier = %session.identifier, "logged out");
        }
        self.screen = Screen::Login;
        self.modal = None;
        self.selected = [0, 0];
        self.column = Column::Incomplete;
        self.notifications.clear();
        self.last_synced = None;
        self.regenerate_captcha();
        BoardCommand::Clear
    }

    /// Handle key event on the board with no modal open.
    fn handle_board_key(&mut self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<BoardCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Char('h' | 'l') => self.column = self.column.other(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(snapshot),
            KeyCode::Char('a') => {
                self.modal = Some(Modal::AddTask {
                    input: TextInput::default(),
                });
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_task(snapshot) {
                    self.modal = Some(Modal::EditTask {
                        id: task.id,
                        input: TextInput::with_value(task.description.clone()),
                        completed: task.completed,
                        original: task.clone(),
                    });
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(task) = self.selected_task(snapshot) {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: task.id,
                        description: task.description.clone(),
                    });
                }
            }
            KeyCode::Char(' ' | 't') => {
                return self
                    .selected_task(snapshot)
                    .map(|task| BoardCommand::SetCompleted {
                        id: task.id,
                        completed: !task.completed,
                    });
            }
            KeyCode::Char('r') => return Some(BoardCommand::Load),
            KeyCode::Char('x') => return Some(BoardCommand::DismissError),
            KeyCode::Char('o') => return Some(self.logout()),
            _ => {}
        }
        None
    }

    /// Handle key event while a modal is open.
    fn handle_modal_key(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        let modal = self.modal.take()?;
        match modal {
            Modal::AddTask { mut input } => match key.code {
                KeyCode::Esc => {}
                KeyCode::Enter => {
                    return Some(BoardCommand::Add {
                        description: input.value().to_string(),
                        owner: self.owner,
                    });
                }
                _ => {
                    input.handle_key(key);
                    self.modal = Some(Modal::AddTask { input });
                }
            },
            Modal::EditTask {
                id,
                mut input,
                mut completed,
                original,
            } => match key.code {
                KeyCode::Esc => {}
                KeyCode::Enter => {
                    let patch = TaskPatch {
                        description: (input.value() != original.description)
                            .then(|| input.value().to_string()),
                        completed: (completed != original.completed).then_some(completed),
                    };
                    if !patch.is_empty() {
                        return Some(BoardCommand::Edit { id, patch });
                    }
                }
                _ => {
                    if key.code == KeyCode::Tab {
                        completed = !completed;
                    } else {
                        input.handle_key(key);
                    }
                    self.modal = Some(Modal::EditTask {
                        id,
                        input,
                        completed,
                        original,
                    });
                }
            },
            Modal::ConfirmDelete { id, description } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => return Some(BoardCommand::Remove { id }),
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.modal = Some(Modal::ConfirmDelete { id, description }),
            },
        }
        None
    }

    /// The task under the cursor in the focused column.
    #[must_use]
    pub fn selected_task<'a>(&self, snapshot: &'a StoreSnapshot) -> Option<&'a Task> {
        let tasks = snapshot.filter_by_status(self.column.completed());
        let row = self.selected[self.column.index()].min(tasks.len().saturating_sub(1));
        tasks.get(row).copied()
    }

    /// Selected row for `column`, clamped to the column length.
    #[must_use]
    pub fn selected_row(&self, column: Column, snapshot: &StoreSnapshot) -> usize {
        let len = snapshot.filter_by_status(column.completed()).len();
        self.selected[column.index()].min(len.saturating_sub(1))
    }

    fn select_prev(&mut self) {
        let row = &mut self.selected[self.column.index()];
        *row = row.saturating_sub(1);
    }

    fn select_next(&mut self, snapshot: &StoreSnapshot) {
        let len = snapshot.filter_by_status(self.column.completed()).len();
        let row = &mut self.selected[self.column.index()];
        if *row + 1 < len {
            *row += 1;
        }
    }

    /// Turn a worker event into a notification.
    pub fn apply_event(&mut self, event: BoardEvent, now: Instant) {
        match event {
            BoardEvent::Loaded { count } => {
                self.last_synced = Some(chrono::Local::now().format("%H:%M").to_string());
                self.notify(format!("Loaded {count} tasks"), Level::Info, now);
            }
            BoardEvent::Added(_) => self.notify("Task added", Level::Info, now),
            BoardEvent::Updated { task: Some(_), .. } => {
                self.notify("Task updated", Level::Info, now);
            }
            BoardEvent::Updated { id, task: None } => {
                tracing::debug!(%id, "update acknowledged for a task no longer shown");
            }
            BoardEvent::Removed { .. } => self.notify("Task deleted", Level::Info, now),
            BoardEvent::Failed { action, error } => {
                self.notify(format!("Could not {action} task: {error}"), Level::Error, now);
            }
        }
    }

    /// Queue a notification.
    pub fn notify(&mut self, message: impl Into<String>, level: Level, now: Instant) {
        self.notifications.push_back(Notification {
            message: message.into(),
            level,
            expires_at: now + self.notification_ttl,
        });
    }

    /// Drop notifications that have expired.
    pub fn expire_notifications(&mut self, now: Instant) {
        self.notifications.retain(|n| n.expires_at > now);
    }

    /// The most recent notification, if any.
    #[must_use]
    pub fn current_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }
}
