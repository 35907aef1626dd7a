//! Error codes for the fulfillment engine's outer surfaces.
//!
//! Every [`OrderError`] maps to one stable [`ErrorCode`] and one HTTP
//! status. Clients branch on the code; the message is for humans.
//!
//! | Status | Codes |
//! |--------|-------|
//! | 404 | `ORDER_NOT_FOUND` |
//! | 409 | `INVALID_TRANSITION`, `ORDER_LOCKED`, `CONCURRENT_WRITE_CONFLICT` |
//! | 400 | `INVALID_REQUEST` |
//! | 422 | `POLICY_VIOLATION`, `INVALID_PARAMETERS` |
//! | 502 | `REFUND_FAILED`, `PAYMENT_NOT_CONFIRMED` |
//! | 503 | `REFUND_PENDING` |
//! | 500 | `INVARIANT_VIOLATION`, `INTERNAL_ERROR` |

use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::order_management::OrderError;

/// Error codes returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request errors
    /// Malformed body or query string.
    InvalidRequest,
    /// A field failed validation.
    InvalidParameters,
    /// A business rule rejected the request.
    PolicyViolation,

    // State errors
    /// The event is not legal in the order's status.
    InvalidTransition,
    /// The field can no longer be edited.
    OrderLocked,
    /// Another writer saved first.
    ConcurrentWriteConflict,

    // Not found
    /// No order with that id.
    OrderNotFound,

    // Gateway errors
    /// The refund did not answer in time.
    RefundPending,
    /// The gateway declined or failed the refund.
    RefundFailed,
    /// The gateway did not confirm the payment.
    PaymentNotConfirmed,

    // Internal errors
    /// An aggregate invariant was broken.
    InvariantViolation,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// HTTP status for this code.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::InvalidParameters | Self::PolicyViolation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidTransition | Self::OrderLocked | Self::ConcurrentWriteConflict => {
                StatusCode::CONFLICT
            }
            Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::RefundPending => StatusCode::SERVICE_UNAVAILABLE,
            Self::RefundFailed | Self::PaymentNotConfirmed => StatusCode::BAD_GATEWAY,
            Self::InvariantViolation | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire name of the code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidParameters => "INVALID_PARAMETERS",
            Self::PolicyViolation => "POLICY_VIOLATION",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::OrderLocked => "ORDER_LOCKED",
            Self::ConcurrentWriteConflict => "CONCURRENT_WRITE_CONFLICT",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::RefundPending => "REFUND_PENDING",
            Self::RefundFailed => "REFUND_FAILED",
            Self::PaymentNotConfirmed => "PAYMENT_NOT_CONFIRMED",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// An error ready to leave the process.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct FulfillmentError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl FulfillmentError {
    /// Create a new error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Malformed request.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Body returned to HTTP clients.
    #[must_use]
    pub fn to_http_response(&self) -> HttpErrorResponse {
        HttpErrorResponse {
            code: self.code.reason().to_string(),
            message: self.message.clone(),
            details: self.context.iter().cloned().collect(),
        }
    }
}

impl From<OrderError> for FulfillmentError {
    fn from(error: OrderError) -> Self {
        let message = error.to_string();
        match error {
            OrderError::InvalidTransition { from, event } => {
                Self::new(ErrorCode::InvalidTransition, message)
                    .with_context("status", from.as_str())
                    .with_context("event", event.as_str())
            }
            OrderError::PolicyViolation { rule, .. } => {
                Self::new(ErrorCode::PolicyViolation, message).with_context("rule", rule)
            }
            OrderError::InvalidParameters { field, .. } => {
                Self::new(ErrorCode::InvalidParameters, message).with_context("field", field)
            }
            OrderError::OrderLocked { status } => {
                Self::new(ErrorCode::OrderLocked, message).with_context("status", status.as_str())
            }
            OrderError::RefundPending { order_id } => {
                Self::new(ErrorCode::RefundPending, message).with_context("order_id", order_id)
            }
            OrderError::RefundFailed { order_id, .. } => {
                Self::new(ErrorCode::RefundFailed, message).with_context("order_id", order_id)
            }
            OrderError::PaymentNotConfirmed { order_id, .. } => {
                Self::new(ErrorCode::PaymentNotConfirmed, message).with_context("order_id", order_id)
            }
            OrderError::ConcurrentWriteConflict { order_id, .. } => {
                Self::new(ErrorCode::ConcurrentWriteConflict, message)
                    .with_context("order_id", order_id)
            }
            OrderError::NotFound { order_id } => {
                Self::new(ErrorCode::OrderNotFound, message).with_context("order_id", order_id)
            }
            OrderError::InvariantViolation { invariant, .. } => {
                Self::new(ErrorCode::InvariantViolation, message)
                    .with_context("invariant", invariant)
            }
            OrderError::DuplicateOrderNumber { order_number } => {
                Self::new(ErrorCode::InternalError, message)
                    .with_context("order_number", order_number)
            }
            OrderError::Persistence { .. } => Self::new(ErrorCode::InternalError, message),
        }
    }
}

impl IntoResponse for FulfillmentError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "Request rejected");
        }
        (status, Json(self.to_http_response())).into_response()
    }
}

/// HTTP error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
}
