//! Request and response payloads exchanged with the backend.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Largest resume accepted for upload (10 MiB).
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// OAuth2 password-grant form expected by the login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginForm<'a> {
    pub grant_type: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub scope: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl<'a> LoginForm<'a> {
    /// Form with the fixed client fields the backend expects.
    pub fn password_grant(email: &'a str, password: &'a str) -> Self {
        Self {
            grant_type: "password",
            username: email,
            password,
            scope: "",
            client_id: "string",
            client_secret: "string",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct JobDescriptionRequest<'a> {
    pub job_description: &'a str,
}

/// A resume file ready to be uploaded.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    /// Create an upload from in-memory bytes.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a resume from disk. The content type is inferred from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::InvalidUpload(format!("not a file: {}", path.display())))?;
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        let content_type = if is_pdf {
            PDF_CONTENT_TYPE
        } else {
            "application/octet-stream"
        };
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::InvalidUpload(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(file_name, content_type, bytes))
    }

    /// Reject anything that is not a PDF under the size limit.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.content_type != PDF_CONTENT_TYPE {
            return Err(ClientError::InvalidUpload(
                "Please upload a PDF file".to_string(),
            ));
        }
        if self.bytes.len() > MAX_RESUME_BYTES {
            return Err(ClientError::InvalidUpload(
                "File size must be less than 10MB".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_under_limit_is_valid() {
        let upload = ResumeUpload::new("cv.pdf", PDF_CONTENT_TYPE, vec![0u8; 1024]);
        assert!(upload.validate().is_ok());
    }

    #[test]
    fn test_non_pdf_is_rejected() {
        let upload = ResumeUpload::new("cv.docx", "application/msword", vec![1, 2, 3]);
        let err = upload.validate().unwrap_err();
        assert!(err.to_string().contains("PDF"));
    }

    #[test]
    fn test_oversized_pdf_is_rejected() {
        let upload = ResumeUpload::new("cv.pdf", PDF_CONTENT_TYPE, vec![0u8; MAX_RESUME_BYTES + 1]);
        assert!(matches!(upload.validate(), Err(ClientError::InvalidUpload(_))));
    }

    #[tokio::test]
    async fn test_from_path_infers_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Resume.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let upload = ResumeUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "Resume.PDF");
        assert_eq!(upload.content_type, PDF_CONTENT_TYPE);
        assert_eq!(upload.bytes, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ResumeUpload::from_path(&dir.path().join("nope.pdf")).await;
        assert!(matches!(result, Err(ClientError::InvalidUpload(_))));
    }

    #[test]
    fn test_login_form_encoding() {
        let form = LoginForm::password_grant("a@b.c", "pw");
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["grant_type"], "password");
        assert_eq!(json["username"], "a@b.c");
        assert_eq!(json["client_id"], "string");
        assert_eq!(json["scope"], "");
    }
}
