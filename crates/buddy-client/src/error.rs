//! Error types for the backend client.

use buddy_core::{is_truthy, normalize};
use serde_json::Value;
use thiserror::Error;

/// Shown in the chat when the backend cannot be reached at all.
pub const CONNECTION_FAILURE_MESSAGE: &str = "I apologize, but I'm having trouble connecting to the server. Please check your connection and try again.";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to establish connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    /// The call requires a bearer token and none is configured.
    #[error("not authenticated: no access token")]
    MissingToken,

    /// The upload was rejected before being sent.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Classify a reqwest failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// Returns true for failures where the backend was never reached.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout | Self::Http(_))
    }

    /// The `detail` or `message` field of a backend error body, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Backend { body, .. } => detail_from_body(body),
            _ => None,
        }
    }

    /// Text to show as the assistant's reply when a chat turn fails.
    pub fn chat_display_message(&self) -> String {
        match self {
            Self::Backend { status, body } => {
                detail_from_body(body).unwrap_or_else(|| format!("Error: {} - {}", status, body))
            }
            Self::MissingToken => "You need to log in before chatting.".to_string(),
            _ => CONNECTION_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Backend detail when present, otherwise `fallback`.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            Self::Backend { .. } => self.detail().unwrap_or_else(|| fallback.to_string()),
            other => other.to_string(),
        }
    }
}

/// Pull `detail`, then `message`, out of a JSON error body.
///
/// FastAPI-style validation errors carry structured `detail` values, so the
/// field is run through the normalizer rather than required to be a string.
fn detail_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find(|v| is_truthy(v))
        .map(normalize)
}
