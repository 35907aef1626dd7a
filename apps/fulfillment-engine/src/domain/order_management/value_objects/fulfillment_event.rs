//! Events that request a status transition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CancelReason;
use crate::domain::shared::{DomainError, Money};

/// A requested transition, with the data it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FulfillmentEvent {
    /// The gateway reports the customer's payment.
    PaymentConfirmed,
    /// Seller starts preparing the shipment.
    BeginProcessing,
    /// Parcel handed to the carrier.
    Ship {
        /// Carrier tracking number.
        tracking_number: String,
    },
    /// Carrier reports delivery.
    Deliver,
    /// Cancel the order, refunding any captured payment first.
    Cancel {
        /// Why the order is cancelled.
        reason: CancelReason,
    },
    /// Refund part or all of a delivered order.
    RefundRequest {
        /// Amount to refund. Defaults to the remaining refundable amount.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<Money>,
        /// Free-text reason.
        reason: String,
    },
}

impl FulfillmentEvent {
    /// The fieldless kind of this event.
    #[must_use]
    pub const fn kind(&self) -> FulfillmentEventKind {
        match self {
            Self::PaymentConfirmed => FulfillmentEventKind::PaymentConfirmed,
            Self::BeginProcessing => FulfillmentEventKind::BeginProcessing,
            Self::Ship { .. } => FulfillmentEventKind::Ship,
            Self::Deliver => FulfillmentEventKind::Deliver,
            Self::Cancel { .. } => FulfillmentEventKind::Cancel,
            Self::RefundRequest { .. } => FulfillmentEventKind::RefundRequest,
        }
    }

    /// Shorthand for a ship event.
    #[must_use]
    pub fn ship(tracking_number: impl Into<String>) -> Self {
        Self::Ship {
            tracking_number: tracking_number.into(),
        }
    }

    /// Shorthand for a cancel event.
    #[must_use]
    pub const fn cancel(reason: CancelReason) -> Self {
        Self::Cancel { reason }
    }

    /// Shorthand for a refund request.
    #[must_use]
    pub fn refund(amount: Option<Money>, reason: impl Into<String>) -> Self {
        Self::RefundRequest {
            amount,
            reason: reason.into(),
        }
    }
}

/// Event name without payload; the key of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentEventKind {
    /// See [`FulfillmentEvent::PaymentConfirmed`].
    PaymentConfirmed,
    /// See [`FulfillmentEvent::BeginProcessing`].
    BeginProcessing,
    /// See [`FulfillmentEvent::Ship`].
    Ship,
    /// See [`FulfillmentEvent::Deliver`].
    Deliver,
    /// See [`FulfillmentEvent::Cancel`].
    Cancel,
    /// See [`FulfillmentEvent::RefundRequest`].
    RefundRequest,
}

impl FulfillmentEventKind {
    /// Every event kind.
    pub const ALL: [Self; 6] = [
        Self::PaymentConfirmed,
        Self::BeginProcessing,
        Self::Ship,
        Self::Deliver,
        Self::Cancel,
        Self::RefundRequest,
    ];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentConfirmed => "payment_confirmed",
            Self::BeginProcessing => "begin_processing",
            Self::Ship => "ship",
            Self::Deliver => "deliver",
            Self::Cancel => "cancel",
            Self::RefundRequest => "refund_request",
        }
    }
}

impl fmt::Display for FulfillmentEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentEventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| DomainError::invalid_value("event", format!("unknown event '{s}'")))
    }
}
