//! Client-side errors
//!
//! Transport and decode failures convert via `From`; HTTP statuses map
//! onto the remaining variants in `HttpClient::status_error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connect, timeout, TLS
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Body did not match the expected envelope shape
    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    /// 401, no usable actor identity on the request
    #[error("Actor identity required")]
    Unauthorized,

    /// 403, the actor lacks the required capability
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400
    #[error("Invalid input: {0}")]
    Validation(String),

    /// 409, duplicate offer or an approval that needs confirmation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 423, someone else holds the edit lease
    #[error("Locked: {0}")]
    Locked(String),

    /// 422, workflow rule violated
    #[error("Rule violation: {0}")]
    BusinessRule(String),

    /// Anything else the server reports
    #[error("Server error: {0}")]
    Internal(String),

    /// JSON encode or decode failure
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
