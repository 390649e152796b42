//! Helpers for talking to the backend and reshaping its replies.

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::GatewayError;

/// The caller's `Authorization` header, forwarded verbatim.
pub fn authorization(headers: &HeaderMap) -> Result<HeaderValue, GatewayError> {
    headers
        .get(AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or(GatewayError::MissingAuthorization)
}

/// Send `request` and parse the reply body as JSON.
pub async fn send(request: RequestBuilder) -> Result<(StatusCode, Value), GatewayError> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    debug!(status = status.as_u16(), len = text.len(), "Backend responded");

    match serde_json::from_str(&text) {
        Ok(data) => Ok((status, data)),
        Err(e) => {
            warn!(status = status.as_u16(), error = %e, "Backend reply is not JSON");
            Err(GatewayError::InvalidBackendResponse)
        }
    }
}

/// Text of `data[key]`, or `fallback` when the field is missing or falsy.
pub fn text_or(data: &Value, key: &str, fallback: &str) -> String {
    match data.get(key).filter(|v| buddy_core::is_truthy(v)) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => buddy_core::normalize(other),
        None => fallback.to_string(),
    }
}

/// Failure reply carrying the backend's `detail`, or `fallback`.
pub fn failure(status: StatusCode, data: &Value, fallback: &str) -> GatewayError {
    GatewayError::Upstream {
        status,
        message: text_or(data, "detail", fallback),
        error: None,
    }
}
