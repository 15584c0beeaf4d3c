//! Store endpoint configuration

use std::time::Duration;

/// Default trace store API URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the trace store lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL; operation paths such as `/traces` are appended to it
    pub base_url: String,
    /// Bound applied to every store request
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Create from environment variables
    ///
    /// Reads `XRAY_BASE_URL` and `XRAY_TIMEOUT_MS`; unset or unparsable
    /// values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("XRAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout = std::env::var("XRAY_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self { base_url, timeout }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join an operation path onto the base URL
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
