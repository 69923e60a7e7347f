//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Level, Screen};
use crate::store::StoreSnapshot;

/// Render the status bar at the bottom of the screen.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    snapshot: &StoreSnapshot,
    remote_label: &str,
) {
    let help_text = match (app.screen, app.modal.is_some()) {
        (Screen::Login, _) => "Tab: next field | Enter: log in | F5: new captcha | Esc: quit",
        (Screen::Board, true) => "Enter: confirm | Esc: cancel",
        (Screen::Board, false) => {
            "a: add | e: edit | space: toggle | d: delete | r: reload | o: log out | q: quit"
        }
    };

    let dot_color = if remote_label == "Offline" {
        theme::OFFLINE
    } else {
        theme::SUCCESS
    };

    let mut spans = vec![
        Span::styled(
            concat!("Taskboard v", env!("CARGO_PKG_VERSION")),
            theme::bold(),
        ),
        Span::raw(" | "),
        Span::styled("\u{25cf}", theme::normal().fg(dot_color)),
        Span::raw(format!(" {remote_label}")),
    ];

    let pending = snapshot.pending_operations();
    if pending > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("{pending} pending"),
            theme::normal().fg(theme::WARNING),
        ));
    }

    spans.push(Span::raw(" | "));
    if let Some(note) = app.current_notification() {
        let style = match note.level {
            Level::Info => theme::normal().fg(theme::SUCCESS),
            Level::Error => theme::error(),
        };
        spans.push(Span::styled(note.message.clone(), style));
    } else if let Some(error) = &snapshot.last_error
        && app.screen == Screen::Board
    {
        spans.push(Span::styled(
            format!("Error: {error} (x: dismiss)"),
            theme::error(),
        ));
    } else {
        spans.push(Span::styled(help_text, theme::dimmed()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
