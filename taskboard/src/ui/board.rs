//! Task board rendering: header with counts and two status columns.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::theme;
use crate::app::{App, Column};
use crate::store::{Lifecycle, StoreSnapshot};

/// Render the board in `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App, snapshot: &StoreSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_header(frame, chunks[0], app, snapshot);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_column(frame, columns[0], app, snapshot, Column::Incomplete);
    render_column(frame, columns[1], app, snapshot, Column::Completed);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, snapshot: &StoreSnapshot) {
    let user = app
        .session
        .as_ref()
        .map_or_else(String::new, |s| format!("  @{}", s.identifier));

    let mut spans = vec![
        Span::styled("Task Management Board", theme::bold()),
        Span::styled(user, theme::dimmed()),
        Span::raw("  "),
        Span::styled(
            format!(
                "Total {} \u{b7} Completed {} \u{b7} Pending {}",
                snapshot.count(),
                snapshot.count_completed(),
                snapshot.count_pending()
            ),
            theme::normal(),
        ),
    ];
    if let Some(at) = &app.last_synced {
        spans.push(Span::styled(format!("  synced {at}"), theme::dimmed()));
    }
    match snapshot.lifecycle {
        Lifecycle::Loading => spans.push(Span::styled(
            "  Loading\u{2026}",
            theme::normal().fg(theme::WARNING),
        )),
        Lifecycle::Failed => spans.push(Span::styled("  Load failed (r: retry)", theme::error())),
        Lifecycle::Idle | Lifecycle::Succeeded => {}
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_column(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    snapshot: &StoreSnapshot,
    column: Column,
) {
    let tasks = snapshot.filter_by_status(column.completed());
    let focused = app.column == column && app.modal.is_none();

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let marker = if task.completed { "[\u{2713}]" } else { "[ ]" };
            ListItem::new(Line::from(vec![
                Span::styled(
                    marker,
                    theme::normal().fg(theme::card_marker(task.completed)),
                ),
                Span::raw(" "),
                Span::styled(task.description.as_str(), theme::normal()),
            ]))
        })
        .collect();

    let title_color = match column {
        Column::Incomplete => theme::INCOMPLETE_TITLE,
        Column::Completed => theme::COMPLETED_TITLE,
    };
    let block = Block::default()
        .title(Span::styled(
            format!("{} ({})", column.title(), tasks.len()),
            theme::panel_title(title_color),
        ))
        .borders(Borders::ALL)
        .border_style(if focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    let mut list = List::new(items).block(block);
    if focused {
        list = list.highlight_style(theme::selected());
    }
    let mut state =
        ListState::default().with_selected(Some(app.selected_row(column, snapshot)));
    frame.render_stateful_widget(list, area, &mut state);
}
