//! Chat query handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::HeaderMap;
use axum::Json;
use buddy_client::http::CHAT_PATH;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::http::responses::ChatQuery;
use crate::http::upstream;
use crate::state::GatewayState;

/// Chat endpoint.
///
/// Forwards `{query}` and returns the backend's reply body untouched; the
/// client normalizes it for display.
pub async fn chat(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatQuery>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let token = upstream::authorization(&headers)?;
    let Json(req) = payload.map_err(|_| GatewayError::InvalidRequest)?;
    debug!("Forwarding chat query");

    let request = state
        .client
        .post(state.backend(CHAT_PATH))
        .header(AUTHORIZATION, token)
        .header(ACCEPT, "application/json")
        .json(&json!({ "query": req.query }));
    let (status, data) = upstream::send(request).await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Chat request rejected");
        return Err(upstream::failure(status, &data, "Chat request failed"));
    }
    Ok(Json(data))
}
