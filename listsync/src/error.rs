//! Error types
//!
//! Two layers of failure exist in this crate. [`TransportError`] covers the
//! HTTP call itself going wrong (no usable response). [`ApiError`] is what
//! controller operations hand back: the server answered, but with a failure
//! the presentation layer has to branch on. Both are values, never panics;
//! callers are never required to catch anything to stay correct.

use std::collections::HashMap;

use thiserror::Error;

/// Result type for crate-level setup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level errors (configuration and client construction)
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),

    /// The configured base URL is not usable
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Tracing subscriber could not be installed
    #[error("tracing init error: {0}")]
    Tracing(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// The HTTP call itself failed; no response reached the client
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection could not be established or broke mid-request
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The request URL could not be constructed
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The response body was not readable as JSON
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }
}

/// Failure of a controller operation, as reported by the server
///
/// # Example
///
/// ```rust
/// use listsync::error::ApiError;
///
/// let err = ApiError::NotFound("voucher 42".to_string());
/// assert!(!err.is_validation());
/// ```
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never completed; carries the transport failure message
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the input with field-level messages
    #[error("{message}")]
    Validation {
        /// Summary message from the server, or a generic fallback
        message: String,
        /// Field name to first error message for that field
        fields: HashMap<String, String>,
    },

    /// Domain conflict (HTTP 409) carrying extra structured payload
    #[error("{message}")]
    Conflict {
        /// Summary message from the server
        message: String,
        /// The structured conflict payload, e.g. the existing resource
        body: serde_json::Value,
    },

    /// The target entity does not exist (stale or deleted id)
    #[error("not found: {0}")]
    NotFound(String),

    /// The response did not match the expected envelope or item shape
    #[error("malformed response: {0}")]
    Decode(String),

    /// Any other server-reported failure
    #[error("{0}")]
    Server(String),
}

impl ApiError {
    /// Whether this is a field-level validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Field-level messages, when present
    pub fn validation_fields(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Decode(msg) => Self::Decode(msg),
            other => Self::Network(other.to_string()),
        }
    }
}
