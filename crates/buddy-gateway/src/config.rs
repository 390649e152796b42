//! Gateway configuration.

use buddy_client::DEFAULT_API_BASE_URL;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP bind address.
    pub bind_addr: String,

    /// Base URL of the backend requests are forwarded to.
    pub backend_url: String,

    /// Timeout for each forwarded request (seconds).
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            backend_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}
