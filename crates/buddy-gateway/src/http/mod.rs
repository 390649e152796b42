//! HTTP server for the gateway.
//!
//! Provides endpoints for:
//! - Login and signup (`/api/auth/login`, `/api/auth/signup`)
//! - Chat queries (`/api/chat`)
//! - Resume and job description uploads (`/api/chat/upload/*`)
//! - Health check (`/health`)

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use buddy_client::MAX_RESUME_BYTES;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::state::GatewayState;

mod handlers;
pub mod responses;
mod upstream;

/// Room for multipart framing around the largest accepted resume.
const UPLOAD_BODY_LIMIT: usize = MAX_RESUME_BYTES + 1024 * 1024;

/// Create the HTTP router.
pub fn create_router(state: Arc<GatewayState>) -> Router {
    // CORS layer for browser front-ends
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Auth routes
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/signup", post(handlers::signup))
        // Chat routes
        .route("/api/chat", post(handlers::chat))
        .route(
            "/api/chat/upload/resume",
            post(handlers::upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/chat/upload/jd", post(handlers::upload_job_description))
        // Observability routes
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `config.bind_addr` and serve until Ctrl-C.
pub async fn serve(config: GatewayConfig) -> Result<(), GatewayError> {
    let state = GatewayState::new(&config)?;
    let listener = TcpListener::bind(&config.bind_addr).await?;

    info!(
        addr = %config.bind_addr,
        backend = %state.backend_url,
        "Gateway listening"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Form, Multipart};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::Json;
    use reqwest::multipart::{Form as MultipartForm, Part};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer t0k")
    }

    async fn fake_login(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
        let ok = form.get("grant_type").map(String::as_str) == Some("password")
            && form.get("client_id").map(String::as_str) == Some("string")
            && form.get("username").map(String::as_str) == Some("ada@example.com")
            && form.get("password").map(String::as_str) == Some("secret");
        if ok {
            (
                StatusCode::OK,
                Json(json!({"access_token": "t0k", "token_type": "bearer", "extra": 1})),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Incorrect email or password"})),
            )
        }
    }

    async fn fake_signup(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body.get("firstName").is_some() {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": "unexpected field"})));
        }
        if body["email"] == "taken@example.com" {
            return (StatusCode::BAD_REQUEST, Json(json!({"detail": "Email already registered"})));
        }
        (StatusCode::CREATED, Json(json!({})))
    }

    async fn fake_chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})));
        }
        let query = body["query"].as_str().unwrap_or_default();
        (StatusCode::OK, Json(json!({"response": format!("echo: {query}")})))
    }

    async fn fake_resume(headers: HeaderMap, mut multipart: Multipart) -> axum::response::Response {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})))
                .into_response();
        }
        let field = multipart.next_field().await.unwrap().unwrap();
        assert_eq!(field.name(), Some("file"));
        let name = field.file_name().unwrap().to_string();
        let size = field.bytes().await.unwrap().len();
        match name.as_str() {
            "crash.pdf" => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
            "bad.pdf" => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"detail": "Unreadable PDF"})),
            )
                .into_response(),
            _ => Json(json!({"message": format!("stored {name} ({size} bytes)")})).into_response(),
        }
    }

    async fn fake_jd(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::FORBIDDEN, Json(json!({})));
        }
        (StatusCode::OK, Json(json!({"received": body})))
    }

    async fn spawn_stack() -> String {
        let backend = Router::new()
            .route("/auth/login", post(fake_login))
            .route("/auth/signup", post(fake_signup))
            .route("/chat", post(fake_chat))
            .route("/chat/upload/resume", post(fake_resume))
            .route("/chat/upload/jd", post(fake_jd));
        let backend_url = spawn(backend).await;

        let config = GatewayConfig {
            backend_url: format!("{backend_url}/"),
            ..GatewayConfig::default()
        };
        let state = GatewayState::new(&config).unwrap();
        spawn(create_router(state)).await
    }

    async fn post_json(url: String, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = reqwest::Client::new().post(url).json(&body);
        if let Some(token) = token {
            request = request.header("authorization", token);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let gateway = spawn_stack().await;
        let body: Value = reqwest::get(format!("{gateway}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_login_returns_token_fields_only() {
        let gateway = spawn_stack().await;
        let (status, body) = post_json(
            format!("{gateway}/api/auth/login"),
            None,
            json!({"email": "ada@example.com", "password": "secret"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"access_token": "t0k", "token_type": "bearer"}));
    }

    #[tokio::test]
    async fn test_login_failure_uses_detail() {
        let gateway = spawn_stack().await;
        let (status, body) = post_json(
            format!("{gateway}/api/auth/login"),
            None,
            json!({"email": "ada@example.com", "password": "wrong"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Incorrect email or password"}));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_request() {
        let gateway = spawn_stack().await;
        let (status, body) = post_json(
            format!("{gateway}/api/auth/login"),
            None,
            json!({"email": "ada@example.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Invalid request"}));
    }

    #[tokio::test]
    async fn test_signup_forwards_credentials_only() {
        let gateway = spawn_stack().await;
        let (status, body) = post_json(
            format!("{gateway}/api/auth/signup"),
            None,
            json!({"firstName": "Ada", "lastName": "L", "email": "ada@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User registered successfully."}));

        let (status, body) = post_json(
            format!("{gateway}/api/auth/signup"),
            None,
            json!({"email": "taken@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Email already registered"}));
    }

    #[tokio::test]
    async fn test_chat_requires_authorization() {
        let gateway = spawn_stack().await;
        let (status, body) =
            post_json(format!("{gateway}/api/chat"), None, json!({"query": "hi"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Authorization token required"}));
    }

    #[tokio::test]
    async fn test_chat_proxies_reply_and_errors() {
        let gateway = spawn_stack().await;
        let (status, body) = post_json(
            format!("{gateway}/api/chat"),
            Some("Bearer t0k"),
            json!({"query": "hi", "ignored": true}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "echo: hi"}));

        let (status, body) = post_json(
            format!("{gateway}/api/chat"),
            Some("Bearer other"),
            json!({"query": "hi"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Not authenticated"}));
    }

    #[tokio::test]
    async fn test_job_description_default_error_message() {
        let gateway = spawn_stack().await;
        let (status, body) = post_json(
            format!("{gateway}/api/chat/upload/jd"),
            Some("Bearer t0k"),
            json!({"job_description": "Rust engineer"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"received": {"job_description": "Rust engineer"}}));

        let (status, body) = post_json(
            format!("{gateway}/api/chat/upload/jd"),
            Some("Bearer nope"),
            json!({"job_description": "Rust engineer"}),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"message": "Job description upload failed"}));
    }

    async fn upload(gateway: &str, form: MultipartForm) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/chat/upload/resume"))
            .header("authorization", "Bearer t0k")
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    fn pdf(name: &str) -> MultipartForm {
        let part = Part::bytes(b"%PDF-1.4".to_vec())
            .file_name(name.to_string())
            .mime_str("application/pdf")
            .unwrap();
        MultipartForm::new().part("file", part)
    }

    #[tokio::test]
    async fn test_resume_upload_forwarded() {
        let gateway = spawn_stack().await;
        let (status, body) = upload(&gateway, pdf("cv.pdf")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "stored cv.pdf (8 bytes)"}));
    }

    #[tokio::test]
    async fn test_resume_upload_without_file() {
        let gateway = spawn_stack().await;
        let form = MultipartForm::new().text("file", "not a file");
        let (status, body) = upload(&gateway, form).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "No file provided"}));
    }

    #[tokio::test]
    async fn test_resume_upload_backend_failures() {
        let gateway = spawn_stack().await;

        let (status, body) = upload(&gateway, pdf("bad.pdf")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({"message": "Unreadable PDF", "error": {"detail": "Unreadable PDF"}})
        );

        let (status, body) = upload(&gateway, pdf("crash.pdf")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({"message": "Invalid response from backend server"}));
    }
}
