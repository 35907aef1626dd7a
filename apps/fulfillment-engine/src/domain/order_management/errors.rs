//! Order management errors.

use std::fmt;

use super::value_objects::{FulfillmentEventKind, OrderStatus};
use crate::domain::shared::DomainError;

/// Errors that can occur while creating, transitioning or editing an order.
///
/// Every variant is per-request: the order is left in its previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// No edge of the transition table matches `(from, event)`.
    InvalidTransition {
        /// Current order status.
        from: OrderStatus,
        /// Requested event.
        event: FulfillmentEventKind,
    },

    /// A business policy guard rejected the request.
    PolicyViolation {
        /// Rule identifier.
        rule: String,
        /// Description of the violation.
        message: String,
    },

    /// Invalid order parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// The order is past `pending`; only notes may change.
    OrderLocked {
        /// Current order status.
        status: OrderStatus,
    },

    /// The payment gateway did not answer a refund in time.
    RefundPending {
        /// Order ID.
        order_id: String,
    },

    /// The payment gateway refused a refund.
    RefundFailed {
        /// Order ID.
        order_id: String,
        /// Gateway message.
        message: String,
    },

    /// The payment gateway did not confirm the payment.
    PaymentNotConfirmed {
        /// Order ID.
        order_id: String,
        /// Gateway message.
        message: String,
    },

    /// The stored version moved since the order was loaded.
    ConcurrentWriteConflict {
        /// Order ID.
        order_id: String,
        /// Version the writer loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Another order already holds this order number.
    DuplicateOrderNumber {
        /// The contested order number.
        order_number: String,
    },

    /// Order not found.
    NotFound {
        /// Order ID.
        order_id: String,
    },

    /// Aggregate invariant violated.
    InvariantViolation {
        /// Invariant description.
        invariant: String,
        /// Current state values.
        state: String,
    },

    /// The persistence adapter failed.
    Persistence {
        /// Adapter message.
        message: String,
    },
}

impl OrderError {
    /// Build a `PolicyViolation`.
    #[must_use]
    pub fn policy(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PolicyViolation {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Build an `InvalidParameters`.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build an `InvariantViolation`.
    #[must_use]
    pub fn invariant(invariant: impl Into<String>, state: impl Into<String>) -> Self {
        Self::InvariantViolation {
            invariant: invariant.into(),
            state: state.into(),
        }
    }

    /// Returns true if retrying the same request later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RefundPending { .. } | Self::ConcurrentWriteConflict { .. }
        )
    }
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { from, event } => {
                write!(f, "Event '{event}' is not allowed in status '{from}'")
            }
            Self::PolicyViolation { rule, message } => {
                write!(f, "Policy '{rule}' violated: {message}")
            }
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid order parameter '{field}': {message}")
            }
            Self::OrderLocked { status } => {
                write!(f, "Order is locked in status '{status}'")
            }
            Self::RefundPending { order_id } => {
                write!(f, "Refund for order {order_id} is pending at the gateway")
            }
            Self::RefundFailed { order_id, message } => {
                write!(f, "Refund for order {order_id} failed: {message}")
            }
            Self::PaymentNotConfirmed { order_id, message } => {
                write!(f, "Payment for order {order_id} not confirmed: {message}")
            }
            Self::ConcurrentWriteConflict {
                order_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Concurrent write on order {order_id}: expected version {expected}, found {actual}"
                )
            }
            Self::DuplicateOrderNumber { order_number } => {
                write!(f, "Order number {order_number} is already taken")
            }
            Self::NotFound { order_id } => {
                write!(f, "Order not found: {order_id}")
            }
            Self::InvariantViolation { invariant, state } => {
                write!(f, "Order invariant violation: {invariant} (state: {state})")
            }
            Self::Persistence { message } => {
                write!(f, "Order persistence failed: {message}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidValue { field, message } => {
                Self::InvalidParameters { field, message }
            }
            DomainError::Overflow { operation } => Self::InvalidParameters {
                field: "amount".to_string(),
                message: format!("arithmetic overflow in {operation}"),
            },
        }
    }
}
