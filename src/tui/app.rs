//! Application State
//!
//! Holds the form fields, the result view and the channel that carries request
//! outcomes back from spawned upload tasks.

use crate::client::AnalyzeApi;
use crate::config::Config;
use crate::models::{AnalysisResult, Submission, UploadFile};
use crate::session::{SubmitTicket, ViewState};
use crate::tui::event::AppAction;
use crate::types::AnalyzeResult;
use ratatui::style::{Modifier, Style};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tui_textarea::TextArea;

/// Form field that currently has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    File,
    Query,
    Username,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::File, FormField::Query, FormField::Username];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::File => "PDF file",
            FormField::Query => "Query",
            FormField::Username => "Username",
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            FormField::File => "Path to the document, e.g. ./reports/q3.pdf",
            FormField::Query => "What should the analysis focus on? (optional)",
            FormField::Username => "anonymous",
        }
    }

    fn next(self) -> Self {
        match self {
            FormField::File => FormField::Query,
            FormField::Query => FormField::Username,
            FormField::Username => FormField::File,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::File => FormField::Username,
            FormField::Query => FormField::File,
            FormField::Username => FormField::Query,
        }
    }
}

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Form,
    Help,
}

/// Events from spawned upload tasks
#[derive(Debug)]
pub enum AppEvent {
    Completed {
        ticket: SubmitTicket,
        outcome: AnalyzeResult<AnalysisResult>,
    },
}

/// Main application state
pub struct App {
    pub config: Config,

    // UI State
    pub view: View,
    pub should_quit: bool,
    pub focus: FormField,
    /// Blocking notification; while set, only dismiss keys are handled
    pub alert: Option<String>,

    // Form State
    pub file_input: TextArea<'static>,
    pub query_input: TextArea<'static>,
    pub username_input: TextArea<'static>,

    // Result State
    pub result: ViewState,
    pub scroll_offset: u16,
    pub max_scroll: u16,

    client: Arc<dyn AnalyzeApi>,
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(config: Config, client: Arc<dyn AnalyzeApi>) -> Self {
        let (tx, rx) = mpsc::channel(16);

        let file_input = new_field(FormField::File, "");
        let query_input = new_field(FormField::Query, &config.form.default_query);
        let username_input = new_field(FormField::Username, &config.form.default_username);

        let mut app = Self {
            config,
            view: View::Form,
            should_quit: false,
            focus: FormField::File,
            alert: None,
            file_input,
            query_input,
            username_input,
            result: ViewState::new(),
            scroll_offset: 0,
            max_scroll: 0,
            client,
            event_rx: rx,
            event_tx: tx,
        };
        app.refresh_cursors();
        app
    }

    pub fn field(&self, field: FormField) -> &TextArea<'static> {
        match field {
            FormField::File => &self.file_input,
            FormField::Query => &self.query_input,
            FormField::Username => &self.username_input,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut TextArea<'static> {
        match field {
            FormField::File => &mut self.file_input,
            FormField::Query => &mut self.query_input,
            FormField::Username => &mut self.username_input,
        }
    }

    /// Current value of a field (fields are single-line)
    pub fn value(&self, field: FormField) -> String {
        self.field(field).lines().join("")
    }

    /// Replace a field's contents
    pub fn set_value(&mut self, field: FormField, value: &str) {
        *self.field_mut(field) = new_field(field, value);
        self.refresh_cursors();
    }

    /// Only the focused field shows a cursor
    fn refresh_cursors(&mut self) {
        for field in FormField::ALL {
            let style = if field == self.focus {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            self.field_mut(field).set_cursor_style(style);
        }
    }

    /// Drain outcomes that have arrived from upload tasks
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Wait for the next upload outcome and apply it
    pub async fn next_event(&mut self) {
        if let Some(event) = self.event_rx.recv().await {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Completed { ticket, outcome } => {
                if let Err(e) = &outcome {
                    warn!(seq = ticket.seq(), error = %e, "Analysis request failed");
                }
                if self.result.complete(ticket, outcome) {
                    self.scroll_offset = 0;
                }
            }
        }
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        if self.alert.is_some() {
            match action {
                AppAction::Escape | AppAction::Submit => self.alert = None,
                AppAction::Quit | AppAction::ForceQuit => self.should_quit = true,
                _ => {}
            }
            return;
        }

        if self.view == View::Help {
            match action {
                AppAction::Tick => {}
                AppAction::Quit | AppAction::ForceQuit => self.should_quit = true,
                _ => self.view = View::Form,
            }
            return;
        }

        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => {
                self.submit().await;
            }
            AppAction::ToggleHelp => {
                self.view = View::Help;
            }
            AppAction::Escape => {}
            AppAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            AppAction::ScrollDown => {
                if self.scroll_offset < self.max_scroll {
                    self.scroll_offset += 1;
                }
            }
            AppAction::ScrollPageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            AppAction::ScrollPageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10).min(self.max_scroll);
            }
            AppAction::NextField => {
                self.focus = self.focus.next();
                self.refresh_cursors();
            }
            AppAction::PrevField => {
                self.focus = self.focus.prev();
                self.refresh_cursors();
            }
            AppAction::ClearField => {
                self.set_value(self.focus, "");
            }
            AppAction::Input(key_event) => {
                let focus = self.focus;
                self.field_mut(focus).input(key_event);
            }
            AppAction::Tick => {}
        }
    }

    /// Submit the form. Ignored while a request is in flight.
    pub async fn submit(&mut self) {
        if self.result.is_in_flight() {
            debug!("Submit ignored while a request is in flight");
            return;
        }

        let path = self.value(FormField::File);
        let path = path.trim();
        let file = if path.is_empty() {
            None
        } else {
            match UploadFile::from_path(path).await {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!("{}", e);
                    self.alert = Some(e.to_string());
                    return;
                }
            }
        };

        let submission = Submission::new(
            file,
            self.value(FormField::Query),
            self.value(FormField::Username),
        );

        let (ticket, request) = match self.result.begin(submission) {
            Ok(accepted) => accepted,
            Err(e) => {
                self.alert = Some(e.to_string());
                return;
            }
        };

        info!(seq = ticket.seq(), file = %request.file().file_name, "Submitting document");
        self.scroll_offset = 0;

        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = client.analyze(request).await;
            tx.send(AppEvent::Completed { ticket, outcome }).await.ok();
        });
    }

    /// Update max scroll based on rendered content height
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}

fn new_field(field: FormField, value: &str) -> TextArea<'static> {
    let mut input = TextArea::new(vec![value.to_string()]);
    input.set_cursor_line_style(Style::default());
    input.set_placeholder_text(field.placeholder());
    input.move_cursor(tui_textarea::CursorMove::End);
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::AnalyzeRequest;
    use crate::session::SubmitState;
    use crate::types::AnalyzeError;
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        requests: Mutex<Vec<AnalyzeRequest>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl AnalyzeApi for FakeApi {
        async fn analyze(&self, request: AnalyzeRequest) -> AnalyzeResult<AnalysisResult> {
            self.requests.lock().unwrap().push(request);
            match self.fail_with {
                Some(status) => Err(AnalyzeError::RequestFailed { status }),
                None => Ok(serde_json::from_str(
                    r#"{"analysis_id":"abc123","analysis":{"summary":"ok","insights":["x","y"]}}"#,
                )?),
            }
        }
    }

    fn app_with(api: Arc<FakeApi>) -> App {
        let config = Config::from_lookup(|_| None).unwrap();
        App::new(config, api)
    }

    async fn temp_pdf(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.pdf", name, std::process::id()));
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_submit_without_file_alerts() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());
        app.set_value(FormField::Query, "test");

        app.handle_action(AppAction::Submit).await;

        assert_eq!(app.alert.as_deref(), Some("Select a PDF"));
        assert_eq!(app.result.state(), SubmitState::Idle);
        assert!(api.requests.lock().unwrap().is_empty());

        // Alert swallows other keys until dismissed
        app.handle_action(AppAction::NextField).await;
        assert_eq!(app.focus, FormField::File);
        app.handle_action(AppAction::Escape).await;
        assert!(app.alert.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_file_alerts() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());
        app.set_value(FormField::File, "/no/such/file.pdf");

        app.submit().await;

        assert!(app.alert.as_deref().unwrap().starts_with("Failed to read /no/such/file.pdf"));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_renders_result() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());
        let path = temp_pdf("app-submit").await;
        app.set_value(FormField::File, path.to_str().unwrap());

        app.submit().await;
        assert_eq!(app.result.view().as_text(), "Analyzing...");
        assert!(app.result.is_in_flight());

        app.next_event().await;
        assert_eq!(app.result.state(), SubmitState::Success);
        assert!(app.result.view().as_text().contains("- x\n- y"));

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].username(), "anonymous");
        assert_eq!(requests[0].query(), "");
        drop(requests);
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_failure_renders_error_line() {
        let api = Arc::new(FakeApi {
            fail_with: Some(502),
            ..FakeApi::default()
        });
        let mut app = app_with(api);
        let path = temp_pdf("app-failure").await;
        app.set_value(FormField::File, path.to_str().unwrap());
        app.set_value(FormField::Username, "dana");

        app.submit().await;
        app.next_event().await;

        assert_eq!(app.result.view().as_text(), "Error: 502");
        assert!(!app.result.is_in_flight());
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_second_submit_ignored_while_in_flight() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());
        let path = temp_pdf("app-inflight").await;
        app.set_value(FormField::File, path.to_str().unwrap());

        app.submit().await;
        let was_in_flight = app.result.is_in_flight();
        app.submit().await;
        app.next_event().await;

        assert!(was_in_flight);
        assert_eq!(api.requests.lock().unwrap().len(), 1);
        assert_eq!(app.result.state(), SubmitState::Success);
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_typing_goes_to_focused_field() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        app.handle_action(AppAction::NextField).await;
        assert_eq!(app.focus, FormField::Query);
        for c in "risk".chars() {
            app.handle_action(AppAction::Input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
                .await;
        }
        assert_eq!(app.value(FormField::Query), "risk");
        assert_eq!(app.value(FormField::File), "");

        app.handle_action(AppAction::ClearField).await;
        assert_eq!(app.value(FormField::Query), "");

        app.handle_action(AppAction::PrevField).await;
        app.handle_action(AppAction::PrevField).await;
        assert_eq!(app.focus, FormField::Username);
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        app.handle_action(AppAction::ToggleHelp).await;
        assert_eq!(app.view, View::Help);
        app.handle_action(AppAction::Tick).await;
        assert_eq!(app.view, View::Help);
        app.handle_action(AppAction::ScrollDown).await;
        assert_eq!(app.view, View::Form);
    }

    #[tokio::test]
    async fn test_scroll_is_clamped() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        app.update_scroll_bounds(25, 10);
        app.handle_action(AppAction::ScrollPageDown).await;
        app.handle_action(AppAction::ScrollPageDown).await;
        assert_eq!(app.scroll_offset, 15);
        app.handle_action(AppAction::ScrollDown).await;
        assert_eq!(app.scroll_offset, 15);

        app.update_scroll_bounds(u16::MAX, 0);
        app.scroll_offset = u16::MAX - 5;
        app.handle_action(AppAction::ScrollPageDown).await;
        assert_eq!(app.scroll_offset, u16::MAX);

        app.update_scroll_bounds(4, 10);
        assert_eq!(app.scroll_offset, 0);
    }

    #[tokio::test]
    async fn test_quit_from_form_and_alert() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api);

        app.alert = Some("Select a PDF".to_string());
        app.handle_action(AppAction::Quit).await;
        assert!(app.should_quit);
    }
}
