use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};

use crate::types::{AnalyzeError, AnalyzeResult};

/// Username sent when the form field is left empty
pub const DEFAULT_USERNAME: &str = "anonymous";

// Form input

/// A selected document, read fully into memory before upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Wrap in-memory bytes, guessing the content type from the file name.
    /// Unknown extensions are sent as PDF.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name).first_or(mime::APPLICATION_PDF);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> AnalyzeResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AnalyzeError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());

        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Raw form values captured at the moment of submit
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub file: Option<UploadFile>,
    pub query: String,
    pub username: String,
}

impl Submission {
    pub fn new(
        file: Option<UploadFile>,
        query: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            file,
            query: query.into(),
            username: username.into(),
        }
    }

    /// Only an empty username is replaced; whitespace is sent as typed.
    pub fn effective_username(&self) -> &str {
        if self.username.is_empty() {
            DEFAULT_USERNAME
        } else {
            &self.username
        }
    }

    /// The one precondition: a file must be selected.
    pub fn validate(self) -> AnalyzeResult<AnalyzeRequest> {
        let username = self.effective_username().to_string();
        let file = self.file.ok_or(AnalyzeError::NoFileSelected)?;

        Ok(AnalyzeRequest {
            file,
            query: self.query,
            username,
        })
    }
}

/// A validated submission, ready to go on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeRequest {
    file: UploadFile,
    query: String,
    username: String,
}

impl AnalyzeRequest {
    pub fn file(&self) -> &UploadFile {
        &self.file
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Multipart body with parts in wire order: `file`, `query`, `username`
    pub fn into_form(self) -> AnalyzeResult<Form> {
        let file_part = Part::bytes(self.file.bytes)
            .file_name(self.file.file_name)
            .mime_str(self.file.content_type.as_ref())?;

        Ok(Form::new()
            .part("file", file_part)
            .text("query", self.query)
            .text("username", self.username))
    }
}

// Service responses

/// Server-assigned identifier, kept exactly as it arrived
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AnalysisId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisId::Number(n) => write!(f, "{}", n),
            AnalysisId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for AnalysisId {
    fn from(id: i64) -> Self {
        AnalysisId::Number(id.into())
    }
}

impl From<&str> for AnalysisId {
    fn from(id: &str) -> Self {
        AnalysisId::Text(id.to_string())
    }
}

/// The analysis body. Every field tolerates being absent or null.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub summary: String,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub insights: Vec<String>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub risks: Vec<String>,
    #[serde(default, deserialize_with = "items_or_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Response body of `POST /analyze`
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub analysis_id: Option<AnalysisId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis: Analysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_processed: Option<String>,
}

impl AnalysisResult {
    /// Identifier as shown in the footer; the JSON literal `null` when the service
    /// sent none
    pub fn display_id(&self) -> String {
        self.analysis_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "null".to_string())
    }
}

/// A stored analysis from `GET /analysis/{id}`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub filename: String,
    pub query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Analysis,
    pub created_at: String,
}

impl AnalysisRecord {
    /// Parses `created_at`, treating timestamps without an offset as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.created_at) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// View the record in the same shape as a fresh upload response
    pub fn to_result(&self) -> AnalysisResult {
        AnalysisResult {
            analysis_id: Some(AnalysisId::from(self.id)),
            analysis: self.result.clone(),
            status: None,
            query: Some(self.query.clone()),
            file_processed: Some(self.filename.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        other => value_text(other),
    })
}

fn items_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(value_text)
        .collect())
}

// Strings verbatim, anything else as compact JSON
fn value_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
