//! Payment Port (Driven Port)
//!
//! Interface for the payment gateway that captures and refunds order payments.

use async_trait::async_trait;

use crate::domain::order_management::{PaymentConfirmation, RefundReceipt, RefundRequest};
use crate::domain::shared::{Money, OrderId};

/// Payment gateway error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    /// The gateway declined the operation.
    #[error("Payment declined: {message}")]
    Declined { message: String },

    /// The gateway could not be reached.
    #[error("Payment gateway unavailable: {message}")]
    Unavailable { message: String },

    /// The request was malformed.
    #[error("Invalid payment request: {message}")]
    InvalidRequest { message: String },
}

/// Port for the payment gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentPort: Send + Sync {
    /// Confirm that the customer's payment for `order_id` was captured.
    ///
    /// `amount` is the order total the gateway is asked to confirm; the
    /// confirmation reports what was actually captured.
    async fn confirm_payment(
        &self,
        order_id: &OrderId,
        amount: Money,
    ) -> Result<PaymentConfirmation, PaymentError>;

    /// Return money to the customer.
    ///
    /// Requests sharing an idempotency key must refund at most once.
    async fn refund(&self, request: RefundRequest) -> Result<RefundReceipt, PaymentError>;
}
