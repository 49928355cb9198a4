//! Form Widget
//!
//! The three input fields, stacked, with the focused one highlighted.

use crate::tui::app::{App, FormField};
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders},
    Frame,
};

/// Height of a single bordered field
pub const FIELD_HEIGHT: u16 = 3;

pub fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(FormField::ALL.map(|_| Constraint::Length(FIELD_HEIGHT)))
        .split(area);

    for (field, row) in FormField::ALL.iter().zip(rows.iter()) {
        let focused = app.focus == *field && app.alert.is_none();
        let title = match field {
            FormField::File => format!(" {} (required) ", field.label()),
            _ => format!(" {} ", field.label()),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if focused {
                Theme::border_focused()
            } else {
                Theme::border()
            });

        let inner = block.inner(*row);
        frame.render_widget(block, *row);
        frame.render_widget(app.field(*field), inner);
    }
}
