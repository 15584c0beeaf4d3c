//! Error types for xray-core

use thiserror::Error;

/// Trace store error type
#[derive(Debug, Error)]
pub enum Error {
    /// Connection refused, reset, or otherwise failed before a response arrived
    #[error("network error: {0}")]
    Network(String),

    /// Store call exceeded its deadline
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Store answered with a non-2xx status
    #[error("store returned status {status}: {body}")]
    Store {
        /// HTTP status code
        status: u16,
        /// Response body, as returned by the store
        body: String,
    },

    /// Referenced trace or step does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Store answered 2xx with a body we could not decode
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be configured
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this failure means the referenced record does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
