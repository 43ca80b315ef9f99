//! Error types used throughout the client

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Categories of client errors, used for logging labels and caller policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Session is no longer valid; the caller must re-authenticate
    Authentication,
    /// Transport failure; safe for the caller to retry
    Network,
    /// Server answered with a non-success status
    Http,
    /// Server-side job reached a terminal failure
    Job,
    /// Local problem (storage, configuration, decoding, cancellation)
    Internal,
}

/// Main error type for PaperLens client operations.
///
/// `Clone` so that a single refresh failure can be handed to every caller
/// queued behind it.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: Value },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// Build an HTTP error from a status code and raw body.
    pub fn http(status: u16, body: Value) -> Self {
        Self::Http { status, body }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::Http { .. } => ErrorCategory::Http,
            Self::JobFailed { .. } => ErrorCategory::Job,
            Self::MalformedResponse(_)
            | Self::Storage(_)
            | Self::Config(_)
            | Self::Decode(_)
            | Self::Cancelled => ErrorCategory::Internal,
        }
    }

    /// `true` when the error ends the session (tokens cleared, re-login required).
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Best-effort human readable message from an HTTP error body.
    ///
    /// Looks at `detail` then `message`, falling back to a bare string body.
    pub fn server_message(&self) -> Option<String> {
        let Self::Http { body, .. } = self else {
            return None;
        };
        match body {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Object(map) => ["detail", "message"]
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str))
                .map(str::to_owned),
            _ => None,
        }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Auth(_) => "auth",
            Self::MalformedResponse(_) => "malformed_response",
            Self::JobFailed { .. } => "job_failed",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Decode(_) => "decode",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for PaperLens operations
pub type Result<T> = std::result::Result<T, ClientError>;
