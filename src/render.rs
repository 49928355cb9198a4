//! Result rendering
//!
//! Pure functions from an `AnalysisResult` (or a failure) to what the result view
//! shows. Two shapes are produced: the HTML card grid the web form used, and a
//! plain-text layout for terminals. Both share the same section order and the same
//! list formatting.

use html_escape::encode_safe;

use crate::models::AnalysisResult;
use crate::types::AnalyzeError;

/// Shown in the result view while a request is in flight
pub const PLACEHOLDER: &str = "Analyzing...";

/// Shown in place of an empty or missing list
pub const EMPTY_LIST: &str = "-";

/// One labeled block of the result view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub body: String,
    pub kind: SectionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Text,
    List,
}

/// `"-"` for an empty list, otherwise `"- a\n- b"` in order
pub fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        return EMPTY_LIST.to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary followed by the four list blocks
pub fn sections(result: &AnalysisResult) -> Vec<Section> {
    let analysis = &result.analysis;
    vec![
        Section {
            title: "Summary",
            body: analysis.summary.clone(),
            kind: SectionKind::Text,
        },
        list_section("Insights", &analysis.insights),
        list_section("Recommendations", &analysis.recommendations),
        list_section("Risks", &analysis.risks),
        list_section("References", &analysis.references),
    ]
}

fn list_section(title: &'static str, items: &[String]) -> Section {
    Section {
        title,
        body: format_list(items),
        kind: SectionKind::List,
    }
}

pub fn footer(result: &AnalysisResult) -> String {
    format!("Analysis ID: {}", result.display_id())
}

/// Card grid markup with a trailing identifier line. Interpolated text is escaped.
pub fn render_html(result: &AnalysisResult) -> String {
    let mut html = String::from("<div class=\"grid\">\n");
    for section in sections(result) {
        let body = encode_safe(&section.body);
        let inner = match section.kind {
            SectionKind::Text => format!("<div>{}</div>", body),
            SectionKind::List => format!("<pre>{}</pre>", body),
        };
        html.push_str(&format!(
            "  <div class=\"card\"><h3>{}</h3>{}</div>\n",
            section.title, inner
        ));
    }
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<div style=\"margin-top:12px;font-size:12px;color:#94a3b8;\">{}</div>",
        encode_safe(&footer(result))
    ));
    html
}

/// Terminal layout: each section title on its own line, its body below, a blank line
/// between sections, then file/provider details and the identifier.
pub fn render_text(result: &AnalysisResult) -> String {
    let mut lines: Vec<String> = Vec::new();
    for section in sections(result) {
        lines.push(section.title.to_string());
        lines.push(section.body);
        lines.push(String::new());
    }
    lines.extend(details(result));
    lines.push(footer(result));
    lines.join("\n")
}

/// Optional context lines the service may include (file, query, provider)
pub fn details(result: &AnalysisResult) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(file) = &result.file_processed {
        lines.push(format!("File: {}", file));
    }
    if let Some(query) = &result.query {
        lines.push(format!("Query: {}", query));
    }
    match (&result.analysis.provider, &result.analysis.model) {
        (Some(provider), Some(model)) => lines.push(format!("Provider: {} ({})", provider, model)),
        (Some(provider), None) => lines.push(format!("Provider: {}", provider)),
        _ => {}
    }
    lines
}

/// The single error line every submit failure collapses into
pub fn render_error(err: &AnalyzeError) -> String {
    format!("Error: {}", err)
}
