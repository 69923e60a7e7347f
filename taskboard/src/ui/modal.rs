//! Modal dialogs: add task, edit task, delete confirmation.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::{centered, theme};
use crate::app::{Modal, TextInput};

/// Render `modal` on top of `area`.
pub fn render(frame: &mut Frame, area: Rect, modal: &Modal) {
    match modal {
        Modal::AddTask { input } => {
            let rect = centered(area, 60, 6);
            let lines = vec![
                input_line(input),
                Line::raw(""),
                Line::styled("Enter: save | Esc: cancel", theme::dimmed()),
            ];
            render_box(frame, rect, " Add Task ", lines);
            set_cursor(frame, rect, input);
        }
        Modal::EditTask {
            input, completed, ..
        } => {
            let rect = centered(area, 60, 7);
            let status = if *completed { "Completed" } else { "Incomplete" };
            let lines = vec![
                input_line(input),
                Line::from(vec![
                    Span::styled("Status: ", theme::dimmed()),
                    Span::styled(
                        status,
                        theme::normal().fg(theme::card_marker(*completed)),
                    ),
                ]),
                Line::raw(""),
                Line::styled("Enter: save | Tab: toggle status | Esc: cancel", theme::dimmed()),
            ];
            render_box(frame, rect, " Edit Task ", lines);
            set_cursor(frame, rect, input);
        }
        Modal::ConfirmDelete { description, .. } => {
            let rect = centered(area, 60, 6);
            let lines = vec![
                Line::styled("Are you sure you want to delete this task?", theme::bold()),
                Line::styled(description.as_str(), theme::normal()),
                Line::styled("y/Enter: delete | n/Esc: cancel", theme::dimmed()),
            ];
            render_box(frame, rect, " Confirm ", lines);
        }
    }
}

fn input_line(input: &TextInput) -> Line<'_> {
    Line::from(vec![
        Span::styled("> ", theme::highlighted()),
        Span::styled(input.value(), theme::normal()),
    ])
}

fn render_box(frame: &mut Frame, rect: Rect, title: &str, lines: Vec<Line<'_>>) {
    let block = Block::default()
        .title(Span::styled(title.to_string(), theme::highlighted()))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}

fn set_cursor(frame: &mut Frame, rect: Rect, input: &TextInput) {
    let offset = u16::try_from(input.cursor()).unwrap_or(u16::MAX);
    // Border plus the "> " prompt.
    let x = rect
        .x
        .saturating_add(3)
        .saturating_add(offset)
        .min(rect.right().saturating_sub(2));
    frame.set_cursor_position((x, rect.y + 1));
}
