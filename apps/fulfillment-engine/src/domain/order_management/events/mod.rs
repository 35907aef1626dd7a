//! Domain events for order management.
//!
//! Every accepted transition records one event on the aggregate. The
//! transition use case drains them after a successful save and forwards
//! them to notifications.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value_objects::{CancelReason, OrderStatus};
use crate::domain::shared::{Money, OrderId, OrderNumber, RefundId, Timestamp};

/// All possible order events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    /// Order placed at checkout.
    Created(OrderCreated),
    /// Payment captured.
    Paid(OrderPaid),
    /// Seller started processing.
    ProcessingStarted(OrderProcessingStarted),
    /// Parcel shipped.
    Shipped(OrderShipped),
    /// Parcel delivered.
    Delivered(OrderDelivered),
    /// Order cancelled.
    Cancelled(OrderCancelled),
    /// Money returned to the customer.
    Refunded(OrderRefunded),
}

impl OrderEvent {
    /// Get the order ID for this event.
    #[must_use]
    pub fn order_id(&self) -> &OrderId {
        match self {
            Self::Created(e) => &e.order_id,
            Self::Paid(e) => &e.order_id,
            Self::ProcessingStarted(e) => &e.order_id,
            Self::Shipped(e) => &e.order_id,
            Self::Delivered(e) => &e.order_id,
            Self::Cancelled(e) => &e.order_id,
            Self::Refunded(e) => &e.order_id,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            Self::Created(e) => e.occurred_at,
            Self::Paid(e) => e.occurred_at,
            Self::ProcessingStarted(e) => e.occurred_at,
            Self::Shipped(e) => e.occurred_at,
            Self::Delivered(e) => e.occurred_at,
            Self::Cancelled(e) => e.occurred_at,
            Self::Refunded(e) => e.occurred_at,
        }
    }

    /// Get the payload-free kind of this event.
    #[must_use]
    pub const fn kind(&self) -> OrderEventKind {
        match self {
            Self::Created(_) => OrderEventKind::Created,
            Self::Paid(_) => OrderEventKind::Paid,
            Self::ProcessingStarted(_) => OrderEventKind::ProcessingStarted,
            Self::Shipped(_) => OrderEventKind::Shipped,
            Self::Delivered(_) => OrderEventKind::Delivered,
            Self::Cancelled(_) => OrderEventKind::Cancelled,
            Self::Refunded(_) => OrderEventKind::Refunded,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// Event name without payload, as delivered to notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventKind {
    /// See [`OrderCreated`].
    Created,
    /// See [`OrderPaid`].
    Paid,
    /// See [`OrderProcessingStarted`].
    ProcessingStarted,
    /// See [`OrderShipped`].
    Shipped,
    /// See [`OrderDelivered`].
    Delivered,
    /// See [`OrderCancelled`].
    Cancelled,
    /// See [`OrderRefunded`].
    Refunded,
}

impl OrderEventKind {
    /// Event type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "ORDER_CREATED",
            Self::Paid => "ORDER_PAID",
            Self::ProcessingStarted => "ORDER_PROCESSING_STARTED",
            Self::Shipped => "ORDER_SHIPPED",
            Self::Delivered => "ORDER_DELIVERED",
            Self::Cancelled => "ORDER_CANCELLED",
            Self::Refunded => "ORDER_REFUNDED",
        }
    }
}

impl fmt::Display for OrderEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event: Order placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    /// Order ID.
    pub order_id: OrderId,
    /// Human-readable order number.
    pub order_number: OrderNumber,
    /// Grand total at creation.
    pub total_amount: Money,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Payment captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaid {
    /// Order ID.
    pub order_id: OrderId,
    /// Gateway transaction id.
    pub payment_reference: String,
    /// Amount captured.
    pub amount: Money,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Processing started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProcessingStarted {
    /// Order ID.
    pub order_id: OrderId,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Parcel shipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShipped {
    /// Order ID.
    pub order_id: OrderId,
    /// Carrier tracking number.
    pub tracking_number: String,
    /// Estimated delivery date.
    pub estimated_delivery: Timestamp,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Parcel delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDelivered {
    /// Order ID.
    pub order_id: OrderId,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Order cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// Order ID.
    pub order_id: OrderId,
    /// Status the order was cancelled from.
    pub previous_status: OrderStatus,
    /// Reason for cancellation.
    pub reason: CancelReason,
    /// Amount refunded as part of the cancellation.
    pub refunded_amount: Money,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}

/// Event: Money returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRefunded {
    /// Order ID.
    pub order_id: OrderId,
    /// Gateway refund id.
    pub refund_id: RefundId,
    /// Amount returned.
    pub amount: Money,
    /// Amount still refundable afterwards.
    pub remaining_refundable: Money,
    /// When the event occurred.
    pub occurred_at: Timestamp,
}
