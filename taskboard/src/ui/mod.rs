//! Terminal UI rendering.
//!
//! Rendering is a pure function of the [`App`] state and the current
//! [`StoreSnapshot`]; nothing here mutates either.

pub mod board;
pub mod login;
pub mod modal;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::app::{App, Screen};
use crate::store::StoreSnapshot;

/// Main draw function for the entire UI.
///
/// `remote_label` names the backend in the status bar ("HTTP", "Offline").
pub fn draw(frame: &mut Frame, app: &App, snapshot: &StoreSnapshot, remote_label: &str) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    match app.screen {
        Screen::Login => login::render(frame, content_area, app),
        Screen::Board => {
            board::render(frame, content_area, app, snapshot);
            if let Some(modal) = &app.modal {
                modal::render(frame, content_area, modal);
            }
        }
    }

    status_bar::render(frame, status_area, app, snapshot, remote_label);
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
#[must_use]
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
