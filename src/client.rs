//! Analysis service client
//!
//! Talks to the document analysis service over HTTP:
//! - `POST /analyze` - multipart upload of a document plus `query` and `username`
//! - `GET /analysis/{id}` - a previously stored analysis
//! - `GET /` - service health message
//!
//! Requests are sent once, with no timeout and no retry. Any non-2xx status becomes
//! `AnalyzeError::RequestFailed` without reading the body.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::models::{AnalysisRecord, AnalysisResult, AnalyzeRequest, HealthStatus};
use crate::types::{AnalyzeError, AnalyzeResult};

/// Service location used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// The upload half of the service, kept behind a trait so the submit handler can be
/// driven without a network.
#[async_trait]
pub trait AnalyzeApi: Send + Sync {
    async fn analyze(&self, request: AnalyzeRequest) -> AnalyzeResult<AnalysisResult>;
}

#[derive(Debug, Clone)]
pub struct AnalyzeClient {
    client: Client,
    base_url: String,
}

impl AnalyzeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch a stored analysis by its identifier
    pub async fn get_analysis(&self, id: impl fmt::Display) -> AnalyzeResult<AnalysisRecord> {
        let url = self.endpoint(&format!("/analysis/{}", id));
        info!(url = %url, "Fetching stored analysis");

        let response = self.client.get(&url).send().await?;
        parse_json(response).await
    }

    pub async fn health(&self) -> AnalyzeResult<HealthStatus> {
        let url = self.endpoint("/");
        debug!(url = %url, "Checking service health");

        let response = self.client.get(&url).send().await?;
        parse_json(response).await
    }
}

impl Default for AnalyzeClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl AnalyzeApi for AnalyzeClient {
    async fn analyze(&self, request: AnalyzeRequest) -> AnalyzeResult<AnalysisResult> {
        let url = self.endpoint("/analyze");
        info!(
            url = %url,
            file = %request.file().file_name,
            bytes = request.file().len(),
            username = %request.username(),
            "Uploading document for analysis"
        );

        let form = request.into_form()?;
        let response = self.client.post(&url).multipart(form).send().await?;

        let result: AnalysisResult = parse_json(response).await?;
        info!(analysis_id = %result.display_id(), "Analysis received");
        Ok(result)
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> AnalyzeResult<T> {
    let status = response.status();
    if !status.is_success() {
        debug!(status = status.as_u16(), "Service returned a failure status");
        return Err(AnalyzeError::RequestFailed {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Submission, UploadFile};
    use mockito::Matcher;

    const SCENARIO_A: &str = r#"{"analysis_id":"abc123","analysis":{"summary":"ok","insights":["x","y"],"recommendations":[],"risks":[],"references":[]}}"#;

    fn request(username: &str) -> AnalyzeRequest {
        Submission::new(
            Some(UploadFile::new("report.pdf", b"%PDF-1.4 fake".to_vec())),
            "growth outlook",
            username,
        )
        .validate()
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AnalyzeClient::new("http://example.test:8000/");
        assert_eq!(client.base_url(), "http://example.test:8000");
        assert_eq!(client.endpoint("/analyze"), "http://example.test:8000/analyze");
        assert_eq!(AnalyzeClient::default().base_url(), DEFAULT_API_BASE);
    }

    #[tokio::test]
    async fn test_analyze_posts_multipart_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::Regex(
                r#"(?s)name="file"; filename="report.pdf".*%PDF-1\.4 fake.*name="query".*growth outlook.*name="username".*anonymous"#
                    .to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SCENARIO_A)
            .create_async()
            .await;

        let client = AnalyzeClient::new(server.url());
        let result = client.analyze(request("")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.display_id(), "abc123");
        assert_eq!(result.analysis.insights, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_non_success_status_skips_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .with_status(500)
            .with_body(r#"{"detail":"Error processing financial document"}"#)
            .create_async()
            .await;

        let client = AnalyzeClient::new(server.url());
        let err = client.analyze(request("alice")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AnalyzeError::RequestFailed { status: 500 }));
        assert_eq!(err.to_string(), "500");
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = AnalyzeClient::new(server.url());
        let err = client.analyze(request("alice")).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::ResponseParse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = AnalyzeClient::new(format!("http://127.0.0.1:{}", port));
        let err = client.analyze(request("alice")).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Network(_)));
    }

    #[tokio::test]
    async fn test_get_analysis_record() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/analysis/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":7,"filename":"q3.pdf","query":"outlook","result":{"summary":"s","risks":["fx"]},"created_at":"2025-01-02T03:04:05"}"#,
            )
            .create_async()
            .await;

        let client = AnalyzeClient::new(server.url());
        let record = client.get_analysis(7).await.unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.result.risks, vec!["fx"]);
        assert!(record.created_at_utc().is_some());
    }

    #[tokio::test]
    async fn test_get_analysis_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/analysis/99")
            .with_status(404)
            .with_body(r#"{"detail":"Analysis not found"}"#)
            .create_async()
            .await;

        let client = AnalyzeClient::new(server.url());
        let err = client.get_analysis(99).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::RequestFailed { status: 404 }));
    }

    #[tokio::test]
    async fn test_health() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"message":"Financial Document Analyzer API is running"}"#)
            .create_async()
            .await;

        let client = AnalyzeClient::new(server.url());
        let health = client.health().await.unwrap();
        assert_eq!(health.message, "Financial Document Analyzer API is running");
    }
}
