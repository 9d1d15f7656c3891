//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failed before a response could be classified.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading an attachment file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with something other than structured data
    /// (plaintext or HTML error page, wrong host). Carries the raw body.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service reported a failure in-band via an `HTTPCode` payload,
    /// or the response body could not be decoded (code 500, with the
    /// decode failure as the message).
    #[error("API error ({code}): {message}")]
    Api {
        /// Error code reported by the service.
        code: u16,
        /// Error message from the service.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity was constructed with neither a client nor complete
    /// credentials.
    #[error("Initialization error: {0}")]
    Initialization(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { code: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { code: 401, .. })
    }

    /// The service-reported error code, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            Error::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
