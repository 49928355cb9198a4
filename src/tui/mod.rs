//! Terminal User Interface Module
//!
//! Interactive form for uploading a document to the analysis service.
//! Built with Ratatui.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  📄 Document Analyzer                   http://localhost:8000   │
//! ├─ PDF file (required) ───────────────────────────────────────────┤
//! │ ./reports/q3.pdf                                                │
//! ├─ Query ─────────────────────────────────────────────────────────┤
//! │ growth outlook                                                  │
//! ├─ Username ──────────────────────────────────────────────────────┤
//! │ anonymous                                                       │
//! ├─ Result ────────────────────────────────────────────────────────┤
//! │ Summary / Insights / Recommendations / Risks / References       │
//! │ Analysis ID: 42                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//!  ✓ Done │ [Enter] Analyze [Tab] Next field [Ctrl+Q] Quit [F1] Help
//! ```
//!
//! Uploads run on spawned tasks; their outcomes come back over a channel and are
//! applied to the result view between frames. A new submit is refused while one
//! is in flight.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, FormField, View};
pub use event::{AppAction, EventHandler};

use crate::client::{AnalyzeApi, AnalyzeClient};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::Arc;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: crate::config::Config) -> anyhow::Result<()> {
    info!(base_url = %config.api.base_url, "Starting TUI mode");

    let client: Arc<dyn AnalyzeApi> = Arc::new(AnalyzeClient::from_config(&config.api));

    let mut terminal = init_terminal()?;
    let mut app = App::new(config, client);
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        // Apply finished uploads before drawing
        app.poll_events();

        let size = terminal.size()?;
        let chunks = ui::layout(Rect::new(0, 0, size.width, size.height));
        let inner = widgets::result_inner(chunks[2]);
        let content_height = widgets::content_height(app.result.view(), inner.width);
        app.update_scroll_bounds(content_height, inner.height);

        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next().await {
            Some(AppAction::Quit) | Some(AppAction::ForceQuit) | None => break,
            Some(action) => app.handle_action(action).await,
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
