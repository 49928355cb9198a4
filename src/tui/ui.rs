//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::session::SubmitState;
use crate::tui::app::{App, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::rc::Rc;

/// Split the screen into header, form, result panel and status bar
pub fn layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                            // Header
            Constraint::Length(widgets::FIELD_HEIGHT * 3),    // Form
            Constraint::Min(6),                               // Result
            Constraint::Length(1),                            // Status bar
        ])
        .split(area)
}

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = layout(frame.area());

    render_header(frame, chunks[0], app);
    widgets::render_form(frame, chunks[1], app);
    widgets::render_result(frame, chunks[2], &app.result, app.scroll_offset);
    render_status_bar(frame, chunks[3], app);

    if app.view == View::Help {
        render_help(frame);
    }
    if let Some(message) = &app.alert {
        render_alert(frame, message);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let title_text = vec![Line::from(vec![
        Span::raw("📄 "),
        Span::styled("Document Analyzer", Theme::title()),
        Span::raw("  "),
        Span::styled(app.config.api.base_url.clone(), Theme::text_secondary()),
    ])];

    let title = Paragraph::new(title_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .style(Style::default()),
        );

    frame.render_widget(title, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = match app.result.state() {
        SubmitState::Idle => Span::styled("Ready", Theme::text_secondary()),
        SubmitState::Submitting => {
            Span::styled(format!("{} Analyzing...", Icons::ACTIVE), Theme::active())
        }
        SubmitState::Success => Span::styled(format!("{} Done", Icons::COMPLETE), Theme::complete()),
        SubmitState::Failed => Span::styled(format!("{} Failed", Icons::ERROR), Theme::error()),
    };

    let shortcuts = vec![
        Span::styled(" [Enter]", Theme::shortcut_key()),
        Span::styled(" Analyze ", Theme::shortcut_desc()),
        Span::styled("[Tab]", Theme::shortcut_key()),
        Span::styled(" Next field ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Q]", Theme::shortcut_key()),
        Span::styled(" Quit ", Theme::shortcut_desc()),
        Span::styled("[F1]", Theme::shortcut_key()),
        Span::styled(" Help", Theme::shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

/// Blocking notification, dismissed with Enter or Esc
fn render_alert(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Theme::warning())),
        Line::from(""),
        Line::from(Span::styled("Press Enter or Esc to continue", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Alert ")
                .borders(Borders::ALL)
                .border_style(Theme::warning()),
        );

    frame.render_widget(paragraph, area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let shortcut = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(key, Theme::shortcut_key()),
            Span::styled(desc, Theme::text()),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        shortcut("Enter        ", "Upload the document for analysis"),
        shortcut("Tab          ", "Next field"),
        shortcut("Shift+Tab    ", "Previous field"),
        shortcut("Ctrl+U       ", "Clear the focused field"),
        shortcut("↑/↓          ", "Scroll result"),
        shortcut("PageUp/Down  ", "Scroll result by page"),
        shortcut("Esc          ", "Dismiss alert"),
        shortcut("Ctrl+Q       ", "Quit application"),
        shortcut("Ctrl+C       ", "Force quit"),
        shortcut("F1           ", "Show this help"),
        Line::from(""),
        Line::from(Span::styled(
            "An empty username is sent as \"anonymous\".",
            Theme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
