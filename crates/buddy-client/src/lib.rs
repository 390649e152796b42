//! Client library for the Interview Buddy backend.
//!
//! Provides an HTTP client for authentication, chat and document uploads,
//! plus the [`InterviewBackend`] trait the chat controller talks to.

pub mod backend;
pub mod error;
pub mod http;
pub mod types;

pub use backend::InterviewBackend;
pub use error::{ClientError, CONNECTION_FAILURE_MESSAGE};
pub use http::{BackendClient, DEFAULT_API_BASE_URL};
pub use types::{LoginForm, ResumeUpload, TokenResponse, MAX_RESUME_BYTES};
