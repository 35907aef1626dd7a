//! Payment gateway outcomes recorded on an order.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{Money, OrderId, RefundId, Timestamp};

/// Gateway confirmation that an order's payment was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// Gateway transaction id.
    pub transaction_id: String,
    /// Amount captured, minor units.
    pub amount: Money,
    /// When the gateway captured the payment.
    pub confirmed_at: Timestamp,
}

/// Instruction to the gateway to return money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Order being refunded.
    pub order_id: OrderId,
    /// Amount to return, minor units.
    pub amount: Money,
    /// `<order_id>:refund:<n>`, stable across retries of the same refund.
    pub idempotency_key: String,
}

impl RefundRequest {
    /// Build a request for the `sequence`-th refund of an order.
    #[must_use]
    pub fn new(order_id: OrderId, amount: Money, sequence: usize) -> Self {
        let idempotency_key = format!("{order_id}:refund:{sequence}");
        Self {
            order_id,
            amount,
            idempotency_key,
        }
    }
}

/// Gateway acknowledgement of a processed refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReceipt {
    /// Gateway refund id.
    pub refund_id: RefundId,
    /// Amount returned.
    pub amount: Money,
    /// When the gateway processed it.
    pub processed_at: Timestamp,
}

/// A refund booked against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecord {
    /// Gateway refund id.
    pub refund_id: RefundId,
    /// Amount returned.
    pub amount: Money,
    /// Why the money was returned.
    pub reason: String,
    /// When the refund was booked.
    pub refunded_at: Timestamp,
}

/// Collaborator results handed to the aggregate when a plan is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Present when the plan required payment confirmation.
    pub payment: Option<PaymentConfirmation>,
    /// Present when the plan required a refund.
    pub refund: Option<RefundReceipt>,
}

impl Settlement {
    /// No collaborator involvement.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            payment: None,
            refund: None,
        }
    }

    /// Settlement carrying a payment confirmation.
    #[must_use]
    pub const fn with_payment(payment: PaymentConfirmation) -> Self {
        Self {
            payment: Some(payment),
            refund: None,
        }
    }

    /// Settlement carrying a refund receipt.
    #[must_use]
    pub const fn with_refund(refund: RefundReceipt) -> Self {
        Self {
            payment: None,
            refund: Some(refund),
        }
    }
}
