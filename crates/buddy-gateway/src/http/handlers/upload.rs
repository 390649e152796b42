//! Resume and job description upload handlers.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::HeaderMap;
use axum::Json;
use buddy_client::http::{UPLOAD_JD_PATH, UPLOAD_RESUME_PATH};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::http::upstream;
use crate::state::GatewayState;

/// Resume upload endpoint.
///
/// Re-packs the multipart `file` field for the backend. The backend's raw
/// body is echoed under `error` when it rejects the file.
pub async fn upload_resume(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, GatewayError> {
    let token = upstream::authorization(&headers)?;
    let mut multipart = multipart.map_err(|_| GatewayError::InvalidRequest)?;

    let file = loop {
        let next = multipart
            .next_field()
            .await
            .map_err(|_| GatewayError::InvalidRequest)?;
        match next {
            Some(field) if field.name() == Some("file") => {
                // A plain text field named `file` is not a file.
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| GatewayError::InvalidRequest)?;
                break Some((file_name, content_type, bytes));
            }
            Some(_) => continue,
            None => break None,
        }
    };
    let (file_name, content_type, bytes) = file.ok_or(GatewayError::NoFile)?;
    info!(file = %file_name, size = bytes.len(), "Resume upload received");

    let mut part = Part::bytes(bytes.to_vec()).file_name(file_name);
    if let Some(content_type) = content_type {
        part = part
            .mime_str(&content_type)
            .map_err(|_| GatewayError::InvalidRequest)?;
    }
    let request = state
        .client
        .post(state.backend(UPLOAD_RESUME_PATH))
        .header(AUTHORIZATION, token)
        .multipart(Form::new().part("file", part));
    let (status, data) = upstream::send(request).await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Resume upload rejected");
        return Err(GatewayError::Upstream {
            status,
            message: upstream::text_or(&data, "detail", "Resume upload failed"),
            error: Some(data),
        });
    }
    Ok(Json(data))
}

/// Job description endpoint. The JSON body is forwarded as is.
pub async fn upload_job_description(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let token = upstream::authorization(&headers)?;
    let Json(body) = payload.map_err(|_| GatewayError::InvalidRequest)?;

    let request = state
        .client
        .post(state.backend(UPLOAD_JD_PATH))
        .header(AUTHORIZATION, token)
        .header(ACCEPT, "application/json")
        .json(&body);
    let (status, data) = upstream::send(request).await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Job description upload rejected");
        return Err(upstream::failure(
            status,
            &data,
            "Job description upload failed",
        ));
    }
    info!("Job description forwarded");
    Ok(Json(data))
}
