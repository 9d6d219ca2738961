//! Error types for backend calls.

use thiserror::Error;

/// Errors that can occur while talking to the clinic backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Failed to reach the backend or read its response
    #[error("Connection failed to '{url}': {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded total timeout
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },

    /// Backend answered 401; the session token is no longer valid
    #[error("Session rejected by backend")]
    Unauthorized,

    /// Backend returned a non-success HTTP status
    #[error("Backend error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Backend returned 2xx with `status` other than "success"
    #[error("Backend rejected the request: {message}")]
    Rejected { message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response from '{path}': {message}")]
    Decode { path: String, message: String },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Short machine-readable kind, used as a log field.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Client(_) => "client_error",
            ApiError::Connection { .. } => "connection_error",
            ApiError::Timeout { .. } => "request_timeout",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Status { .. } => "status_error",
            ApiError::Rejected { .. } => "rejected",
            ApiError::Decode { .. } => "decode_error",
        }
    }
}
