//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::http::responses::MessageResponse;

/// Errors returned to gateway callers as `{ "message": ... }` bodies.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Authorization token required")]
    MissingAuthorization,

    #[error("Invalid request")]
    InvalidRequest,

    #[error("No file provided")]
    NoFile,

    #[error("Invalid response from backend server")]
    InvalidBackendResponse,

    /// The backend answered with a failure status.
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        /// Raw backend body, echoed back for upload failures.
        error: Option<Value>,
    },

    #[error("Backend server unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// HTTP status sent to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingAuthorization => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest | GatewayError::NoFile => StatusCode::BAD_REQUEST,
            GatewayError::InvalidBackendResponse | GatewayError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Upstream { status, .. } => *status,
            GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Gateway request failed");
        }
        let body = match self {
            GatewayError::Upstream { message, error, .. } => MessageResponse { message, error },
            GatewayError::Transport(_) => MessageResponse::new("Backend server unreachable"),
            other => MessageResponse::new(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
