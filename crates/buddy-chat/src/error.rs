//! Error types for chat session handling.

use buddy_client::ClientError;
use buddy_core::CoreError;
use thiserror::Error;

/// Errors that can occur while managing chat sessions.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Session or turn rule violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Backend call failed outside of a chat turn (uploads).
    #[error("backend error: {0}")]
    Backend(#[from] ClientError),

    /// Storage backend I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while persisting.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
