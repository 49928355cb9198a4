//! Result Widget
//!
//! Shows the placeholder, the rendered analysis, or the error line.

use crate::render::{self, SectionKind};
use crate::session::{ResultView, ViewState};
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn block(state: &ViewState) -> Block<'static> {
    let border_style = if state.is_in_flight() {
        Theme::border_focused()
    } else {
        Theme::border()
    };
    Block::default()
        .title(" Result ")
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Area inside the result panel's border
pub fn result_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

pub fn render_result(frame: &mut Frame, area: Rect, state: &ViewState, scroll: u16) {
    let block = block(state);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    frame.render_widget(paragraph(state.view()).scroll((scroll, 0)), inner);
}

fn paragraph(view: &ResultView) -> Paragraph<'static> {
    Paragraph::new(result_lines(view)).wrap(Wrap { trim: false })
}

/// Lines for the result panel, same order as the plain-text rendering
pub fn result_lines(view: &ResultView) -> Vec<Line<'static>> {
    match view {
        ResultView::Empty => vec![Line::from(Span::styled(
            "Choose a PDF and press Enter to analyze it.",
            Theme::text_dim(),
        ))],
        ResultView::Analyzing => vec![Line::from(Span::styled(
            render::PLACEHOLDER,
            Theme::active(),
        ))],
        ResultView::Error(line) => vec![Line::from(Span::styled(line.clone(), Theme::error()))],
        ResultView::Analysis(result) => {
            let mut lines = Vec::new();
            for section in render::sections(result) {
                lines.push(Line::from(Span::styled(section.title, Theme::heading())));
                let style = match section.kind {
                    SectionKind::Text => Theme::text(),
                    SectionKind::List => Theme::text_secondary(),
                };
                for body_line in section.body.split('\n') {
                    lines.push(Line::from(Span::styled(body_line.to_string(), style)));
                }
                lines.push(Line::from(""));
            }
            for detail in render::details(result) {
                lines.push(Line::from(Span::styled(detail, Theme::text_dim())));
            }
            lines.push(Line::from(Span::styled(render::footer(result), Theme::text_dim())));
            lines
        }
    }
}

/// Rows the result needs once word-wrapped to `width` columns
pub fn content_height(view: &ResultView, width: u16) -> u16 {
    let rows = paragraph(view).line_count(width);
    u16::try_from(rows).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisResult;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered() -> ResultView {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"analysis_id":"abc123","analysis":{"summary":"ok","insights":["x","y"]}}"#,
        )
        .unwrap();
        ResultView::Analysis(Box::new(result))
    }

    fn plain(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_lines_match_text_rendering() {
        let view = rendered();
        assert_eq!(plain(&result_lines(&view)), view.as_text());
    }

    #[test]
    fn test_placeholder_and_error() {
        assert_eq!(plain(&result_lines(&ResultView::Analyzing)), "Analyzing...");
        assert_eq!(
            plain(&result_lines(&ResultView::Error("Error: 500".to_string()))),
            "Error: 500"
        );
    }

    #[test]
    fn test_content_height_wraps() {
        let view = ResultView::Error("x".repeat(25));
        assert_eq!(content_height(&view, 10), 3);
        assert_eq!(content_height(&view, 25), 1);
        assert_eq!(content_height(&rendered(), 80), result_lines(&rendered()).len() as u16);
    }

    fn drawn_rows(view: &ResultView, width: u16) -> u16 {
        let mut terminal = Terminal::new(TestBackend::new(width, 20)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(paragraph(view), frame.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .filter(|&y| (0..buffer.area.width).any(|x| buffer[(x, y)].symbol() != " "))
            .map(|y| y + 1)
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_content_height_follows_word_wrap() {
        let view = ResultView::Error("aaaaaa bbbbbb cccccc dddddd".to_string());
        assert_eq!(drawn_rows(&view, 10), 4);
        assert_eq!(content_height(&view, 10), drawn_rows(&view, 10));
    }
}
