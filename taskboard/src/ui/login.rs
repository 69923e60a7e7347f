//! Login screen rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{centered, theme};
use crate::app::App;
use crate::login::LoginField;

/// Render the login form centered in `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let form_area = centered(area, 50, 16);
    let block = Block::default()
        .title(Span::styled(" Log-in ", theme::highlighted()))
        .borders(Borders::ALL)
        .border_style(theme::normal());
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // identifier
            Constraint::Length(3), // password
            Constraint::Length(1), // captcha challenge
            Constraint::Length(3), // captcha answer
            Constraint::Length(1), // error
            Constraint::Min(0),
        ])
        .split(inner);

    render_field(frame, rows[0], app, LoginField::Identifier);
    render_field(frame, rows[1], app, LoginField::Password);

    let challenge = app
        .captcha
        .text()
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ");
    let captcha_line = Line::from(vec![
        Span::styled(format!(" {challenge} "), theme::captcha()),
        Span::styled("  F5: reload captcha", theme::dimmed()),
    ]);
    frame.render_widget(Paragraph::new(captcha_line), rows[2]);

    render_field(frame, rows[3], app, LoginField::Captcha);

    if let Some(error) = &app.login_error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.as_str(), theme::error())),
            rows[4],
        );
    }
}

fn render_field(frame: &mut Frame, area: Rect, app: &App, field: LoginField) {
    let focused = app.login_focus == field;
    let input = app.login_input(field);
    let shown = if field == LoginField::Password {
        "\u{2022}".repeat(input.value().chars().count())
    } else {
        input.value().to_string()
    };

    let border = if focused {
        theme::highlighted()
    } else {
        theme::dimmed()
    };
    let block = Block::default()
        .title(field.label())
        .borders(Borders::ALL)
        .border_style(border);
    frame.render_widget(Paragraph::new(shown).block(block), area);

    if focused {
        let offset = u16::try_from(input.cursor()).unwrap_or(u16::MAX);
        let x = (area.x + 1).saturating_add(offset).min(area.right().saturating_sub(2));
        frame.set_cursor_position((x, area.y + 1));
    }
}
