//! HTTP client for the backend REST endpoints.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::types::{
    ChatRequest, Credentials, JobDescriptionRequest, LoginForm, ResumeUpload, TokenResponse,
};

/// Hosted backend used when no other base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://interview-buddy-backend.vercel.app";

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const CHAT_PATH: &str = "/chat";
pub const UPLOAD_RESUME_PATH: &str = "/chat/upload/resume";
pub const UPLOAD_JD_PATH: &str = "/chat/upload/jd";

const SIGNUP_OK: &str = "User registered successfully.";
const RESUME_OK: &str = "Resume uploaded successfully! I can now analyze your background.";
const JD_OK: &str = "Job description received! I can now generate tailored interview questions.";

/// HTTP client for the Interview Buddy backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    /// Create a new client without a request timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Create a client whose requests fail after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Builder method to set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace or clear the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }

    /// Exchange email and password for an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, "POST login");

        let request = self
            .inner
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&LoginForm::password_grant(email, password));
        let (status, body) = send(request).await?;
        let value = success_json(status, &body)?;

        // A 2xx without a token is still a failed login.
        let has_token = value
            .get("access_token")
            .and_then(Value::as_str)
            .is_some_and(|t| !t.is_empty());
        if !has_token {
            return Err(ClientError::Backend { status, body });
        }
        serde_json::from_value(value).map_err(|e| ClientError::Serialization(e.to_string()))
    }

    /// Register a new account. Returns the backend's confirmation text.
    pub async fn signup(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let url = self.url(SIGNUP_PATH);
        debug!(url = %url, "POST signup");

        let request = self
            .inner
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&Credentials { email, password });
        let (status, body) = send(request).await?;
        let value = success_json(status, &body)?;
        Ok(message_or(&value, SIGNUP_OK))
    }

    /// Send a chat query. The reply is returned untouched for normalization.
    ///
    /// A success body that is not JSON comes back as a JSON string.
    pub async fn chat(&self, query: &str) -> Result<Value, ClientError> {
        let url = self.url(CHAT_PATH);
        debug!(url = %url, query_len = query.len(), "POST chat");

        let request = self.authorized(
            self.inner
                .post(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&ChatRequest { query }),
        )?;
        let (status, body) = send(request).await?;
        if !(200..300).contains(&status) {
            warn!(status, "Chat request rejected by backend");
            return Err(ClientError::Backend { status, body });
        }
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }

    /// Upload a PDF resume as multipart field `file`.
    pub async fn upload_resume(&self, upload: &ResumeUpload) -> Result<String, ClientError> {
        upload.validate()?;
        let url = self.url(UPLOAD_RESUME_PATH);
        debug!(url = %url, file = %upload.file_name, size = upload.bytes.len(), "POST resume");

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        let request = self.authorized(
            self.inner
                .post(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .multipart(Form::new().part("file", part)),
        )?;
        let (status, body) = send(request).await?;
        let value = success_json(status, &body)?;
        Ok(message_or(&value, RESUME_OK))
    }

    /// Submit the job description the interview should target.
    pub async fn upload_job_description(&self, description: &str) -> Result<String, ClientError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ClientError::InvalidUpload(
                "Job description is empty".to_string(),
            ));
        }
        let url = self.url(UPLOAD_JD_PATH);
        debug!(url = %url, len = description.len(), "POST job description");

        let request = self.authorized(
            self.inner
                .post(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&JobDescriptionRequest {
                    job_description: description,
                }),
        )?;
        let (status, body) = send(request).await?;
        let value = success_json(status, &body)?;
        Ok(message_or(&value, JD_OK))
    }
}

async fn send(request: RequestBuilder) -> Result<(u16, String), ClientError> {
    let response: Response = request.send().await.map_err(ClientError::from_transport)?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(ClientError::from_transport)?;
    Ok((status, body))
}

/// Parse a JSON success body, or turn a non-2xx status into an error.
fn success_json(status: u16, body: &str) -> Result<Value, ClientError> {
    if !(200..300).contains(&status) {
        return Err(ClientError::Backend {
            status,
            body: body.to_string(),
        });
    }
    serde_json::from_str(body).map_err(|e| ClientError::Serialization(e.to_string()))
}

fn message_or(value: &Value, fallback: &str) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
