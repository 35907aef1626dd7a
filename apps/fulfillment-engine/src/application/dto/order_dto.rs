//! Order DTOs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::order_management::{
    CancelReason, CreateOrderCommand, CustomerSnapshot, FulfillmentEvent, FulfillmentEventKind,
    LineItem, Order, OrderError, OrderStateMachine, OrderStatus, PaymentStatus, RefundRecord,
    ShippingAddress, ShippingMethod,
};
use crate::domain::order_query::{OrderStats, QueryResult};
use crate::domain::shared::{Currency, Money, Quantity, Timestamp};

/// A line item as submitted at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInputDto {
    /// Catalog product id.
    pub product_id: String,
    /// Product name at purchase time.
    pub name: String,
    /// Unit price, minor units.
    pub unit_price: i64,
    /// Units ordered.
    pub quantity: u32,
}

impl LineItemInputDto {
    /// Convert to a domain line item.
    pub fn to_domain(&self) -> Result<LineItem, OrderError> {
        Ok(LineItem::new(
            self.product_id.as_str(),
            self.name.as_str(),
            Money::from_minor(self.unit_price),
            Quantity::new(self.quantity)?,
        ))
    }
}

/// DTO for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderDto {
    /// Customer details.
    pub customer: CustomerSnapshot,
    /// Items, at least one.
    pub items: Vec<LineItemInputDto>,
    /// Shipping address, if known.
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    /// Shipping method; standard when omitted.
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    /// Initial notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrderDto {
    /// Convert to the domain command.
    pub fn to_command(&self) -> Result<CreateOrderCommand, OrderError> {
        let items = self
            .items
            .iter()
            .map(LineItemInputDto::to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CreateOrderCommand {
            customer: self.customer.clone(),
            items,
            shipping_address: self.shipping_address.clone(),
            shipping_method: self.shipping_method,
            notes: self.notes.clone(),
        })
    }
}

/// DTO for requesting a transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequestDto {
    /// Event name, e.g. `ship` or `refund_request`.
    pub event: String,
    /// Required for `ship`.
    #[serde(default)]
    pub tracking_number: Option<String>,
    /// Free-text reason for `cancel` and `refund_request`.
    #[serde(default)]
    pub reason: Option<String>,
    /// Refund amount in minor units; remaining refundable when omitted.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Order version the caller last saw; stale requests get a 409.
    #[serde(default)]
    pub expected_version: Option<u64>,
    /// Status the caller last saw; the event is rejected if the order has
    /// moved on.
    #[serde(default)]
    pub expected_status: Option<OrderStatus>,
}

impl TransitionRequestDto {
    /// Convert to a domain event.
    pub fn to_event(&self) -> Result<FulfillmentEvent, OrderError> {
        let kind: FulfillmentEventKind = self.event.parse()?;
        let event = match kind {
            FulfillmentEventKind::PaymentConfirmed => FulfillmentEvent::PaymentConfirmed,
            FulfillmentEventKind::BeginProcessing => FulfillmentEvent::BeginProcessing,
            FulfillmentEventKind::Ship => {
                FulfillmentEvent::ship(self.tracking_number.clone().unwrap_or_default())
            }
            FulfillmentEventKind::Deliver => FulfillmentEvent::Deliver,
            FulfillmentEventKind::Cancel => FulfillmentEvent::cancel(
                self.reason
                    .as_deref()
                    .map_or_else(CancelReason::customer_requested, CancelReason::seller_requested),
            ),
            FulfillmentEventKind::RefundRequest => FulfillmentEvent::refund(
                self.amount.map(Money::from_minor),
                self.reason.clone().unwrap_or_else(|| "customer request".to_string()),
            ),
        };
        Ok(event)
    }
}

/// A line item as shown to operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemDto {
    /// Catalog product id.
    pub product_id: String,
    /// Product name.
    pub name: String,
    /// Unit price, minor units.
    pub unit_price: i64,
    /// Units ordered.
    pub quantity: u32,
    /// `unit_price * quantity`, minor units.
    pub line_total: i64,
}

/// DTO representing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDto {
    /// Order ID.
    pub id: String,
    /// Human-readable order number.
    pub order_number: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Customer snapshot.
    pub customer: CustomerSnapshot,
    /// Items.
    pub items: Vec<LineItemDto>,
    /// Shipping address.
    pub shipping_address: Option<ShippingAddress>,
    /// Shipping method.
    pub shipping_method: ShippingMethod,
    /// Subtotal, minor units.
    pub subtotal: i64,
    /// Shipping cost, minor units.
    pub shipping_cost: i64,
    /// Tax, minor units.
    pub tax_amount: i64,
    /// Total, minor units.
    pub total_amount: i64,
    /// Total formatted for display.
    pub total_display: String,
    /// Sum of refunds, minor units.
    pub refunded_total: i64,
    /// Refunds.
    pub refunds: Vec<RefundRecord>,
    /// Gateway transaction id.
    pub payment_reference: Option<String>,
    /// Carrier tracking number.
    pub tracking_number: Option<String>,
    /// Estimated delivery, once shipped.
    pub estimated_delivery: Option<Timestamp>,
    /// Cancellation reason.
    pub cancel_reason: Option<CancelReason>,
    /// Seller notes.
    pub notes: String,
    /// Created at.
    pub created_at: Timestamp,
    /// Paid at.
    pub paid_at: Option<Timestamp>,
    /// Shipped at.
    pub shipped_at: Option<Timestamp>,
    /// Delivered at.
    pub delivered_at: Option<Timestamp>,
    /// Cancelled at.
    pub cancelled_at: Option<Timestamp>,
    /// Updated at.
    pub updated_at: Timestamp,
    /// Stored version.
    pub version: u64,
    /// Events legal in the current status.
    pub valid_events: Vec<FulfillmentEventKind>,
    /// Statuses reachable in one step.
    pub valid_next_states: Vec<OrderStatus>,
}

impl OrderDto {
    /// Create from domain Order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        let totals = order.totals();
        Self {
            id: order.id().to_string(),
            order_number: order.order_number().to_string(),
            status: order.status(),
            payment_status: order.payment_status(),
            customer: order.customer().clone(),
            items: order
                .items()
                .iter()
                .map(|item| LineItemDto {
                    product_id: item.product_id.to_string(),
                    name: item.name.clone(),
                    unit_price: item.unit_price.minor_units(),
                    quantity: item.quantity.value(),
                    line_total: item.line_total().map_or(0, |m| m.minor_units()),
                })
                .collect(),
            shipping_address: order.shipping_address().cloned(),
            shipping_method: order.shipping_method(),
            subtotal: totals.subtotal.minor_units(),
            shipping_cost: totals.shipping_cost.minor_units(),
            tax_amount: totals.tax_amount.minor_units(),
            total_amount: totals.total_amount.minor_units(),
            total_display: totals.total_amount.format(Currency::Usd),
            refunded_total: order.refunded_total().minor_units(),
            refunds: order.refunds().to_vec(),
            payment_reference: order.payment_reference().map(str::to_string),
            tracking_number: order.tracking_number().map(str::to_string),
            estimated_delivery: order.estimated_delivery(),
            cancel_reason: order.cancel_reason().cloned(),
            notes: order.notes().to_string(),
            created_at: order.created_at(),
            paid_at: order.paid_at(),
            shipped_at: order.shipped_at(),
            delivered_at: order.delivered_at(),
            cancelled_at: order.cancelled_at(),
            updated_at: order.updated_at(),
            version: order.version(),
            valid_events: OrderStateMachine::valid_events(order.status()),
            valid_next_states: OrderStateMachine::valid_next_states(order.status()),
        }
    }
}

/// Aggregates over a query's matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatsDto {
    /// Number of matches.
    pub count: usize,
    /// Sum of totals, minor units.
    pub total_revenue: i64,
    /// Mean total, minor units; zero when nothing matched.
    pub average_order_value: i64,
    /// Matches per status.
    pub status_counts: BTreeMap<String, usize>,
}

impl From<&OrderStats> for OrderStatsDto {
    fn from(stats: &OrderStats) -> Self {
        Self {
            count: stats.count,
            total_revenue: stats.total_revenue.minor_units(),
            average_order_value: stats.average_order_value.minor_units(),
            status_counts: stats
                .status_counts
                .iter()
                .map(|(status, n)| (status.as_str().to_string(), *n))
                .collect(),
        }
    }
}

/// Filtered orders plus their aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResultDto {
    /// Matching orders, oldest first.
    pub orders: Vec<OrderDto>,
    /// Aggregates over `orders`.
    pub stats: OrderStatsDto,
}

impl From<&QueryResult> for QueryResultDto {
    fn from(result: &QueryResult) -> Self {
        Self {
            orders: result.matches.iter().map(OrderDto::from_order).collect(),
            stats: OrderStatsDto::from(&result.stats),
        }
    }
}
