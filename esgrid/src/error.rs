//! Error types for the Elasticsearch grid adapter

use serde::{Deserialize, Serialize};

/// Message used when the `_mapping` endpoint answers with nothing usable
pub const MISSING_MAPPING_MESSAGE: &str = "Elastic Search did not return a mapping";

/// Adapter errors
#[derive(Debug, thiserror::Error)]
pub enum EsGridError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Elastic Search did not return a mapping")]
    MissingMapping,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification used by callers that only care about the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    UnsupportedOperation,
    Transport,
    Config,
}

impl EsGridError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::Transport { .. } | Self::Http(_) | Self::MissingMapping | Self::Json(_) => {
                ErrorKind::Transport
            }
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status attached to the failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Uniform error object handed back to the grid
///
/// Serializes as `{"title": ..., "message": ...}`, or `{"message": ...}` when
/// there is no title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
}

impl GridError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
        }
    }

    pub fn with_title(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{}: {}", title, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for GridError {}

impl From<EsGridError> for GridError {
    fn from(err: EsGridError) -> Self {
        match err {
            EsGridError::Transport { status, body } => {
                GridError::with_title(format!("Failed: {} code", status), body)
            }
            // No HTTP status means the request never got an answer
            EsGridError::Http(e) => GridError::with_title(
                format!("Failed: {} code", e.status().map_or(0, |s| s.as_u16())),
                e.to_string(),
            ),
            other => GridError::new(other.to_string()),
        }
    }
}
