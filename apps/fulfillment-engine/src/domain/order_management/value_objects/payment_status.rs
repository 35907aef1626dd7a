//! Payment status of an order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the order's money stands with the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment captured.
    #[default]
    Unpaid,
    /// Full payment captured.
    Completed,
    /// Entire captured amount returned.
    Refunded,
    /// Part of the captured amount returned.
    PartiallyRefunded,
}

impl PaymentStatus {
    /// Returns true once a payment has ever been captured.
    #[must_use]
    pub const fn has_been_paid(&self) -> bool {
        !matches!(self, Self::Unpaid)
    }

    /// Returns true if some captured money could still be returned.
    #[must_use]
    pub const fn is_refundable(&self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyRefunded)
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Completed => "completed",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
