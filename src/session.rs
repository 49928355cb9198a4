//! Submit handling
//!
//! The result view is an owned `ViewState` that the caller passes in explicitly.
//! A submit moves it through:
//!
//! ```text
//! Idle ──submit──▶ Submitting ("Analyzing...") ──▶ Success (rendered analysis)
//!                                               └─▶ Failed  ("Error: <text>")
//! ```
//!
//! Every accepted submit gets a `SubmitTicket` carrying a sequence number. Only the
//! outcome for the newest ticket is applied, so overlapping requests resolve to the
//! last submission no matter which response arrives first.

use tracing::{debug, info, warn};

use crate::client::AnalyzeApi;
use crate::models::{AnalysisResult, AnalyzeRequest, Submission};
use crate::render;
use crate::types::{AnalyzeError, AnalyzeResult};

/// Observable submit state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

/// What the result container currently shows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultView {
    #[default]
    Empty,
    Analyzing,
    Analysis(Box<AnalysisResult>),
    Error(String),
}

impl ResultView {
    pub fn as_html(&self) -> String {
        match self {
            ResultView::Empty => String::new(),
            ResultView::Analyzing => render::PLACEHOLDER.to_string(),
            ResultView::Analysis(result) => render::render_html(result),
            ResultView::Error(line) => line.clone(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            ResultView::Empty => String::new(),
            ResultView::Analyzing => render::PLACEHOLDER.to_string(),
            ResultView::Analysis(result) => render::render_text(result),
            ResultView::Error(line) => line.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    seq: u64,
}

impl SubmitTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    view: ResultView,
    seq: u64,
    in_flight: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ResultView {
        &self.view
    }

    pub fn state(&self) -> SubmitState {
        match self.view {
            ResultView::Empty => SubmitState::Idle,
            ResultView::Analyzing => SubmitState::Submitting,
            ResultView::Analysis(_) => SubmitState::Success,
            ResultView::Error(_) => SubmitState::Failed,
        }
    }

    /// True between an accepted submit and the outcome of its latest ticket
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Validate the submission and, if a file is present, switch to the placeholder.
    /// A rejected submission leaves the view untouched.
    pub fn begin(&mut self, submission: Submission) -> AnalyzeResult<(SubmitTicket, AnalyzeRequest)> {
        let request = submission.validate()?;

        self.seq += 1;
        self.in_flight = true;
        self.view = ResultView::Analyzing;
        debug!(seq = self.seq, "Submission accepted");

        Ok((SubmitTicket { seq: self.seq }, request))
    }

    /// Apply an outcome. Returns false if a newer submission has started since
    /// `ticket` was issued; the outcome is then dropped.
    pub fn complete(&mut self, ticket: SubmitTicket, outcome: AnalyzeResult<AnalysisResult>) -> bool {
        match outcome {
            Ok(result) => self.succeed(ticket, result),
            Err(err) => self.fail(ticket, &err),
        }
    }

    pub fn succeed(&mut self, ticket: SubmitTicket, result: AnalysisResult) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = false;
        self.view = ResultView::Analysis(Box::new(result));
        true
    }

    pub fn fail(&mut self, ticket: SubmitTicket, err: &AnalyzeError) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = false;
        self.view = ResultView::Error(render::render_error(err));
        true
    }

    fn is_current(&self, ticket: SubmitTicket) -> bool {
        if ticket.seq != self.seq {
            debug!(stale = ticket.seq, latest = self.seq, "Dropping outcome of superseded submission");
            return false;
        }
        true
    }
}

/// Blocking user notification (the form's alert)
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Result of one pass through `handle_submit`
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Precondition failed; nothing was sent and the view is unchanged
    Rejected(AnalyzeError),
    Rendered,
    Failed(AnalyzeError),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Rendered)
    }
}

/// Run one whole submit cycle against `api`, writing into `view`.
pub async fn handle_submit<A>(
    api: &A,
    view: &mut ViewState,
    notifier: &dyn Notifier,
    submission: Submission,
) -> SubmitOutcome
where
    A: AnalyzeApi + ?Sized,
{
    let (ticket, request) = match view.begin(submission) {
        Ok(accepted) => accepted,
        Err(err) => {
            warn!("Submission rejected: {}", err);
            notifier.alert(&err.to_string());
            return SubmitOutcome::Rejected(err);
        }
    };

    match api.analyze(request).await {
        Ok(result) => {
            info!(seq = ticket.seq(), analysis_id = %result.display_id(), "Rendering analysis");
            view.succeed(ticket, result);
            SubmitOutcome::Rendered
        }
        Err(err) => {
            warn!(seq = ticket.seq(), error = %err, "Analysis request failed");
            view.fail(ticket, &err);
            SubmitOutcome::Failed(err)
        }
    }
}
