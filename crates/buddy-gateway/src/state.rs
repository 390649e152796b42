//! Shared gateway state.

use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Shared gateway state.
pub struct GatewayState {
    /// Client used for all forwarded requests.
    pub client: reqwest::Client,

    /// Backend base URL without a trailing slash.
    pub backend_url: String,
}

impl GatewayState {
    /// Create a new GatewayState wrapped in Arc.
    pub fn new(config: &GatewayConfig) -> Result<Arc<Self>, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Arc::new(Self {
            client,
            backend_url: config.backend_url.trim_end_matches('/').to_string(),
        }))
    }

    /// Absolute backend URL for `path`.
    pub fn backend(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }
}
