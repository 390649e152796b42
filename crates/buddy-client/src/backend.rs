//! Backend seam used by the chat controller.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::BackendClient;
use crate::types::ResumeUpload;

/// Operations a chat session needs from the remote backend.
///
/// Implemented by [`BackendClient`]; tests provide scripted fakes.
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    /// Send a chat query and return the raw reply payload.
    async fn chat(&self, query: &str) -> Result<Value, ClientError>;

    /// Upload a resume. Returns the confirmation text to display.
    async fn upload_resume(&self, upload: &ResumeUpload) -> Result<String, ClientError>;

    /// Submit a job description. Returns the confirmation text to display.
    async fn upload_job_description(&self, description: &str) -> Result<String, ClientError>;
}

#[async_trait]
impl InterviewBackend for BackendClient {
    async fn chat(&self, query: &str) -> Result<Value, ClientError> {
        BackendClient::chat(self, query).await
    }

    async fn upload_resume(&self, upload: &ResumeUpload) -> Result<String, ClientError> {
        BackendClient::upload_resume(self, upload).await
    }

    async fn upload_job_description(&self, description: &str) -> Result<String, ClientError> {
        BackendClient::upload_job_description(self, description).await
    }
}
