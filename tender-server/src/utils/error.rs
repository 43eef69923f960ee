//! Unified error handling
//!
//! Application-level error type and response envelope:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - API response structure
//!
//! # Error codes
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E0xxx  | Request / business errors | E0002 validation failed |
//! | E3xxx  | Authentication errors | E3001 missing identity |
//! | E9xxx  | System errors | E9002 database error |
//!
//! # Usage
//!
//! ```ignore
//! // Return an error
//! Err(AppError::not_found("Order 42 not found"))
//!
//! // Return a success envelope
//! Ok(ok(data))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::error::MarketError;
use tracing::error;

use crate::store::StoreError;

/// Unified API response envelope
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 = success)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Application error with an HTTP mapping
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Identity errors (4xx) ==========
    #[error("Actor identity required")]
    /// Missing or malformed actor headers (401)
    Unauthorized,

    #[error("Permission denied: {0}")]
    /// Actor lacks the required capability (403)
    Forbidden(String),

    // ========== Business errors (4xx) ==========
    #[error("Resource not found: {0}")]
    /// Resource does not exist (404)
    NotFound(String),

    #[error("Conflict: {0}")]
    /// Duplicate submission or an approval hold (409)
    Conflict(String),

    #[error("Resource locked: {0}")]
    /// Held edit lease on the target resource (423)
    Locked(String),

    #[error("Validation failed: {0}")]
    /// Input validation failed (400)
    Validation(String),

    #[error("Workflow rule violated: {0}")]
    /// State machine or bidding rule violated (422)
    BusinessRule(String),

    // ========== System errors (5xx) ==========
    #[error("Storage error: {0}")]
    /// Storage failure (500)
    Database(String),

    #[error("Internal error: {0}")]
    /// Unexpected failure (500)
    Internal(String),

    #[error("Malformed request: {0}")]
    /// Unparseable request (400)
    Invalid(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Identity (401 / 403)
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "E3001",
                "Actor identity required".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Locked (423)
            AppError::Locked(msg) => (StatusCode::LOCKED, "E0007", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Business rule (422)
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.clone())
            }

            // Storage errors (500)
            AppError::Database(msg) => {
                error!(target: "store", error = %msg, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Storage error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }

            // Invalid request (400)
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0006", msg.clone()),
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
            trace_id: None,
        });

        (status, body).into_response()
    }
}

impl From<MarketError> for AppError {
    fn from(e: MarketError) -> Self {
        match &e {
            MarketError::Validation { .. } => AppError::Validation(e.to_string()),
            MarketError::DuplicateOffer { .. } | MarketError::BiddingClosed { .. } => {
                AppError::Conflict(e.to_string())
            }
            MarketError::LockHeld { .. } => AppError::Locked(e.to_string()),
            MarketError::LeaseExpired(_) => AppError::BusinessRule(e.to_string()),
            MarketError::InvalidTransition { .. } | MarketError::Terminal { .. } => {
                AppError::BusinessRule(e.to_string())
            }
            MarketError::NotFound { .. } => AppError::NotFound(e.to_string()),
            MarketError::Transaction(_) => AppError::Database(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Database(e.to_string())
    }
}

// ========== Constructor shorthand ==========

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ========== Success envelopes ==========

/// Wrap a payload in the success envelope
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
        trace_id: None,
    })
}

/// Success envelope with a caller-supplied message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
        trace_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;

    #[test]
    fn test_market_error_status_mapping() {
        let cases = [
            (
                AppError::from(MarketError::validation("Brake Pads", "price must be > 0")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(MarketError::DuplicateOffer {
                    order_id: 1,
                    supplier: "A".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(MarketError::LockHeld {
                    offer_id: 1,
                    remaining_secs: 30,
                }),
                StatusCode::LOCKED,
            ),
            (
                AppError::from(MarketError::Terminal {
                    order_id: 1,
                    status: OrderStatus::Cancelled,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(MarketError::not_found("order", 9)),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
