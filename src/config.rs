use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::client::DEFAULT_API_BASE;

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub form: FormConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Values pre-filled into the form
#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    pub default_query: String,
    pub default_username: String,
}

impl FormConfig {
    /// Query given on the command line, else the configured default
    pub fn query_or(&self, query: Option<String>) -> String {
        query.unwrap_or_else(|| self.default_query.clone())
    }

    pub fn username_or(&self, username: Option<String>) -> String {
        username.unwrap_or_else(|| self.default_username.clone())
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ANALYZER_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            api: ApiConfig {
                base_url: normalize_base_url(&base_url)?,
            },
            form: FormConfig {
                default_query: lookup("ANALYZER_QUERY").unwrap_or_default(),
                default_username: lookup("ANALYZER_USERNAME").unwrap_or_default(),
            },
            logging: LoggingConfig {
                filter: lookup("RUST_LOG").unwrap_or_else(|| "doc_analyzer=info".to_string()),
                log_dir: lookup("ANALYZER_LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_log_dir),
            },
        })
    }

    /// Override the service location (e.g. from `--base-url`)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.api.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("doc-analyzer")
        .join("logs")
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = reqwest::Url::parse(trimmed)
        .with_context(|| format!("Invalid service URL: {}", trimmed))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Service URL must be http or https: {}", trimmed);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
