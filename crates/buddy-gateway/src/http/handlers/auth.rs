//! Login and signup handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::ACCEPT;
use axum::http::StatusCode;
use axum::Json;
use buddy_client::http::{LOGIN_PATH, SIGNUP_PATH};
use buddy_client::LoginForm;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::http::responses::{LoginRequest, LoginResponse, MessageResponse, SignupRequest};
use crate::http::upstream;
use crate::state::GatewayState;

const SIGNUP_OK: &str = "User registered successfully.";

/// Login endpoint.
///
/// Turns the JSON credentials into the backend's password-grant form and
/// returns only the token fields.
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, GatewayError> {
    let Json(req) = payload.map_err(|_| GatewayError::InvalidRequest)?;

    let request = state
        .client
        .post(state.backend(LOGIN_PATH))
        .header(ACCEPT, "application/json")
        .form(&LoginForm::password_grant(&req.email, &req.password));
    let (status, mut data) = upstream::send(request).await?;

    let has_token = !upstream::text_or(&data, "access_token", "").is_empty();
    if !status.is_success() || !has_token {
        warn!(status = status.as_u16(), "Login rejected");
        // A 2xx without a token is still a failed login.
        let status = if status.is_success() {
            StatusCode::UNAUTHORIZED
        } else {
            status
        };
        return Err(upstream::failure(status, &data, "Login failed"));
    }

    let mut field = |key: &str| data.get_mut(key).map(Value::take).filter(|v| !v.is_null());
    info!("Login succeeded");
    Ok(Json(LoginResponse {
        access_token: field("access_token").unwrap_or_default(),
        token_type: field("token_type"),
        expires_in: field("expires_in"),
        refresh_token: field("refresh_token"),
    }))
}

/// Signup endpoint. Only email and password reach the backend.
pub async fn signup(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    let Json(req) = payload.map_err(|_| GatewayError::InvalidRequest)?;

    let request = state
        .client
        .post(state.backend(SIGNUP_PATH))
        .header(ACCEPT, "application/json")
        .json(&json!({ "email": req.email, "password": req.password }));
    let (status, data) = upstream::send(request).await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Signup rejected");
        return Err(upstream::failure(status, &data, "Signup failed"));
    }

    info!("Signup succeeded");
    Ok(Json(MessageResponse::new(upstream::text_or(
        &data, "message", SIGNUP_OK,
    ))))
}
