//! Reasons attached to cancellations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason for order cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancelReason {
    /// Cancellation code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl CancelReason {
    /// Create a new cancel reason.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Customer asked to cancel.
    #[must_use]
    pub fn customer_requested() -> Self {
        Self::new("CUSTOMER_REQUESTED", "Customer requested cancellation")
    }

    /// Seller cancelled (out of stock, cannot fulfil, ...).
    #[must_use]
    pub fn seller_requested(message: impl Into<String>) -> Self {
        Self::new("SELLER_REQUESTED", message)
    }

    /// Unpaid order aged past the auto-cancel window.
    #[must_use]
    pub fn auto_cancel_timeout() -> Self {
        Self::new(
            "AUTO_CANCEL_TIMEOUT",
            "Order was not paid within the auto-cancel window",
        )
    }

    /// Returns true if the scheduler issued this cancellation.
    #[must_use]
    pub fn is_automatic(&self) -> bool {
        self.code == "AUTO_CANCEL_TIMEOUT"
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_reason_display() {
        let reason = CancelReason::customer_requested();
        assert_eq!(
            reason.to_string(),
            "[CUSTOMER_REQUESTED] Customer requested cancellation"
        );
    }

    #[test]
    fn cancel_reason_auto() {
        assert!(CancelReason::auto_cancel_timeout().is_automatic());
        assert!(!CancelReason::seller_requested("Out of stock").is_automatic());
    }
}
