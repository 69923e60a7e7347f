//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success indicator color; also marks completed cards.
pub const SUCCESS: Color = Color::Green;

/// Warning indicator color (loading, pending operations).
pub const WARNING: Color = Color::Yellow;

/// Error indicator color; also marks incomplete cards.
pub const ERROR: Color = Color::Red;

/// Offline indicator color.
pub const OFFLINE: Color = Color::DarkGray;

/// Panel title color for the incomplete column.
pub const INCOMPLETE_TITLE: Color = Color::LightRed;

/// Panel title color for the completed column.
pub const COMPLETED_TITLE: Color = Color::LightGreen;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (metadata, help text).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused panel borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Style for the status bar background.
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style for error messages.
#[must_use]
pub fn error() -> Style {
    Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
}

/// Style for the captcha challenge (struck through like a distorted image).
#[must_use]
pub fn captcha() -> Style {
    Style::default()
        .fg(Color::Rgb(255, 165, 0))
        .bg(Color::Rgb(40, 40, 40))
        .add_modifier(Modifier::BOLD | Modifier::ITALIC | Modifier::CROSSED_OUT)
}

/// Marker color for a card with the given completion flag.
#[must_use]
pub const fn card_marker(completed: bool) -> Color {
    if completed { SUCCESS } else { ERROR }
}
