//! Configuration for the Elasticsearch adapter
//!
//! Default config file: `esgrid.toml` in the working directory.

use crate::error::EsGridError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How response bodies are handed back to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Parse the body as JSON
    #[default]
    Json,
    /// Return the raw body as a JSON string
    Text,
}

impl std::str::FromStr for ResponseFormat {
    type Err = EsGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(EsGridError::Config(format!(
                "unknown response format '{}' (expected json or text)",
                other
            ))),
        }
    }
}

/// Per-endpoint request options
///
/// Passed explicitly to every client; there is no process-wide default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EsOptions {
    /// Extra headers added to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Content type of request bodies
    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default)]
    pub response_format: ResponseFormat,

    /// Request timeout in milliseconds; unset leaves it to the HTTP client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl Default for EsOptions {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            content_type: default_content_type(),
            response_format: ResponseFormat::default(),
            timeout_ms: None,
        }
    }
}

impl EsOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// ES type/table URL, e.g. `http://localhost:9200/twitter/tweet`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub options: EsOptions,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter string
    /// Override with RUST_LOG env var
    #[serde(default = "default_level")]
    pub level: String,

    /// Log output format: "pretty" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load_from(path: &Path) -> Result<Self, EsGridError> {
        let content = fs::read_to_string(path).map_err(|e| {
            EsGridError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| EsGridError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load config from file path, or fall back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, EsGridError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, EsGridError> {
        toml::from_str(content).map_err(|e| EsGridError::Config(e.to_string()))
    }
}
