// Error taxonomy for the analysis client

use std::path::PathBuf;

/// Everything that can go wrong between pressing submit and rendering a result.
///
/// The `Display` text of the submit failures is what ends up after `Error: ` in the
/// result view, so `RequestFailed` renders as the bare status code.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// No file was chosen; raised before any request is built
    #[error("Select a PDF")]
    NoFileSelected,

    #[error("{status}")]
    RequestFailed { status: u16 },

    #[error("{0}")]
    ResponseParse(#[from] serde_json::Error),

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalyzeError {
    /// True for the errors raised before a request exists.
    pub fn is_precondition(&self) -> bool {
        matches!(self, AnalyzeError::NoFileSelected | AnalyzeError::FileRead { .. })
    }
}

pub type AnalyzeResult<T> = std::result::Result<T, AnalyzeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_displays_bare_status() {
        let err = AnalyzeError::RequestFailed { status: 500 };
        assert_eq!(err.to_string(), "500");
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_no_file_selected_message() {
        assert_eq!(AnalyzeError::NoFileSelected.to_string(), "Select a PDF");
        assert!(AnalyzeError::NoFileSelected.is_precondition());
    }

    #[test]
    fn test_parse_error_keeps_parser_text() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let expected = source.to_string();
        let err = AnalyzeError::from(source);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_file_read_mentions_path() {
        let err = AnalyzeError::FileRead {
            path: PathBuf::from("/tmp/missing.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Failed to read /tmp/missing.pdf: not found");
    }
}
