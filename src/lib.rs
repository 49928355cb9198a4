// Doc Analyzer - client for the document analysis service

pub mod config;
pub mod types;
pub mod models;
pub mod client;    // HTTP transport for /analyze and friends
pub mod render;
pub mod session;   // Result view state and the submit handler
pub mod tui;       // Terminal User Interface
pub mod utils;

// Re-exports for convenience
pub use client::{AnalyzeApi, AnalyzeClient, DEFAULT_API_BASE};
pub use config::Config;
pub use models::{AnalysisResult, Submission, UploadFile};
pub use session::{handle_submit, Notifier, SubmitOutcome, ViewState};
pub use types::{AnalyzeError, AnalyzeResult};
