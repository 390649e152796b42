//! HTTP request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Auth types
// ============================================================================

/// Request body for the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for the signup endpoint.
///
/// Names may arrive with the form but are ignored, never forwarded.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Tokens handed back after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Value>,
}

// ============================================================================
// Chat types
// ============================================================================

/// Request body for the chat endpoint. Only `query` is forwarded.
#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    #[serde(default)]
    pub query: Value,
}

// ============================================================================
// Message types
// ============================================================================

/// Plain `{ "message": ... }` body used for confirmations and errors.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }
}
