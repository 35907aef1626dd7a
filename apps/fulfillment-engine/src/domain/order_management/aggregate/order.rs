//! Order Aggregate Root
//!
//! The Order aggregate owns the fulfillment lifecycle of one customer
//! purchase. Status changes only happen by applying a [`TransitionPlan`]
//! produced by the state machine; seller edits are limited to notes once
//! the order has left `pending`.

use serde::{Deserialize, Serialize};

use crate::domain::order_management::errors::OrderError;
use crate::domain::order_management::events::{
    OrderCancelled, OrderCreated, OrderDelivered, OrderEvent, OrderPaid, OrderProcessingStarted,
    OrderRefunded, OrderShipped,
};
use crate::domain::order_management::services::{PlannedAction, TransitionPlan};
use crate::domain::order_management::value_objects::{
    CancelReason, CustomerSnapshot, LineItem, OrderStatus, OrderTotals, PaymentConfirmation,
    PaymentStatus, PricingSnapshot, RefundReceipt, RefundRecord, Settlement, ShippingAddress,
    ShippingMethod,
};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{Money, OrderId, OrderNumber, Timestamp};

/// Parameters for reconstituting an Order from storage.
///
/// Used by repositories to rebuild aggregates from persisted state.
/// No domain events are generated during reconstitution.
#[derive(Debug, Clone)]
pub struct ReconstitutedOrderParams {
    /// Order identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: OrderNumber,
    /// Customer snapshot.
    pub customer: CustomerSnapshot,
    /// Line items.
    pub items: Vec<LineItem>,
    /// Shipping address.
    pub shipping_address: Option<ShippingAddress>,
    /// Shipping method.
    pub shipping_method: ShippingMethod,
    /// Derived totals.
    pub totals: OrderTotals,
    /// Policy snapshot used for pricing.
    pub pricing: PricingSnapshot,
    /// Current status.
    pub status: OrderStatus,
    /// Current payment status.
    pub payment_status: PaymentStatus,
    /// Gateway transaction id.
    pub payment_reference: Option<String>,
    /// Carrier tracking number.
    pub tracking_number: Option<String>,
    /// Booked refunds.
    pub refunds: Vec<RefundRecord>,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Payment timestamp.
    pub paid_at: Option<Timestamp>,
    /// Shipment timestamp.
    pub shipped_at: Option<Timestamp>,
    /// Delivery timestamp.
    pub delivered_at: Option<Timestamp>,
    /// Cancellation timestamp.
    pub cancelled_at: Option<Timestamp>,
    /// Cancellation reason.
    pub cancel_reason: Option<CancelReason>,
    /// Seller notes.
    pub notes: String,
    /// Last update timestamp.
    pub updated_at: Timestamp,
    /// Stored version.
    pub version: u64,
}

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Customer snapshot.
    pub customer: CustomerSnapshot,
    /// Line items; at least one.
    pub items: Vec<LineItem>,
    /// Shipping address, if known at checkout.
    pub shipping_address: Option<ShippingAddress>,
    /// Shipping method.
    pub shipping_method: ShippingMethod,
    /// Initial notes.
    pub notes: Option<String>,
}

impl CreateOrderCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if required parameters are missing or invalid.
    pub fn validate(&self) -> Result<(), OrderError> {
        self.customer.validate()?;
        validate_items(&self.items)?;
        if let Some(address) = &self.shipping_address {
            address.validate()?;
        }
        Ok(())
    }
}

fn validate_items(items: &[LineItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::invalid("items", "an order needs at least one item"));
    }
    for item in items {
        item.validate()?;
    }
    Ok(())
}

/// Order Aggregate Root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: OrderNumber,
    customer: CustomerSnapshot,
    items: Vec<LineItem>,
    shipping_address: Option<ShippingAddress>,
    shipping_method: ShippingMethod,
    totals: OrderTotals,
    pricing: PricingSnapshot,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_reference: Option<String>,
    tracking_number: Option<String>,
    refunds: Vec<RefundRecord>,
    created_at: Timestamp,
    paid_at: Option<Timestamp>,
    shipped_at: Option<Timestamp>,
    delivered_at: Option<Timestamp>,
    cancelled_at: Option<Timestamp>,
    cancel_reason: Option<CancelReason>,
    notes: String,
    updated_at: Timestamp,
    version: u64,
    #[serde(skip)]
    events: Vec<OrderEvent>,
}

impl Order {
    /// Create a new `pending`/`unpaid` order priced under `policy`.
    ///
    /// Generates an `OrderCreated` event.
    ///
    /// # Errors
    ///
    /// Returns error if command validation or pricing fails.
    pub fn create(
        cmd: CreateOrderCommand,
        order_number: OrderNumber,
        policy: &BusinessPolicy,
        now: Timestamp,
    ) -> Result<Self, OrderError> {
        cmd.validate()?;
        let (totals, pricing) = OrderTotals::compute(&cmd.items, cmd.shipping_method, policy)?;

        let id = OrderId::generate();
        let mut order = Self {
            id: id.clone(),
            order_number: order_number.clone(),
            customer: cmd.customer,
            items: cmd.items,
            shipping_address: cmd.shipping_address,
            shipping_method: cmd.shipping_method,
            totals,
            pricing,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_reference: None,
            tracking_number: None,
            refunds: Vec::new(),
            created_at: now,
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            cancel_reason: None,
            notes: cmd.notes.unwrap_or_default(),
            updated_at: now,
            version: 0,
            events: Vec::new(),
        };

        order.events.push(OrderEvent::Created(OrderCreated {
            order_id: id,
            order_number,
            total_amount: totals.total_amount,
            occurred_at: now,
        }));

        Ok(order)
    }

    /// Reconstitute an order from stored state (no events generated).
    #[must_use]
    pub fn reconstitute(params: ReconstitutedOrderParams) -> Self {
        Self {
            id: params.id,
            order_number: params.order_number,
            customer: params.customer,
            items: params.items,
            shipping_address: params.shipping_address,
            shipping_method: params.shipping_method,
            totals: params.totals,
            pricing: params.pricing,
            status: params.status,
            payment_status: params.payment_status,
            payment_reference: params.payment_reference,
            tracking_number: params.tracking_number,
            refunds: params.refunds,
            created_at: params.created_at,
            paid_at: params.paid_at,
            shipped_at: params.shipped_at,
            delivered_at: params.delivered_at,
            cancelled_at: params.cancelled_at,
            cancel_reason: params.cancel_reason,
            notes: params.notes,
            updated_at: params.updated_at,
            version: params.version,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Get the order number.
    #[must_use]
    pub const fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Get the customer snapshot.
    #[must_use]
    pub const fn customer(&self) -> &CustomerSnapshot {
        &self.customer
    }

    /// Get the line items.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Get the shipping address.
    #[must_use]
    pub const fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    /// Get the shipping method.
    #[must_use]
    pub const fn shipping_method(&self) -> ShippingMethod {
        self.shipping_method
    }

    /// Get the derived totals.
    #[must_use]
    pub const fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// Get the policy snapshot used for pricing.
    #[must_use]
    pub const fn pricing(&self) -> &PricingSnapshot {
        &self.pricing
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Get the payment status.
    #[must_use]
    pub const fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Get the gateway transaction id.
    #[must_use]
    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    /// Get the carrier tracking number.
    #[must_use]
    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    /// Get the booked refunds.
    #[must_use]
    pub fn refunds(&self) -> &[RefundRecord] {
        &self.refunds
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the payment timestamp.
    #[must_use]
    pub const fn paid_at(&self) -> Option<Timestamp> {
        self.paid_at
    }

    /// Get the shipment timestamp.
    #[must_use]
    pub const fn shipped_at(&self) -> Option<Timestamp> {
        self.shipped_at
    }

    /// Get the delivery timestamp.
    #[must_use]
    pub const fn delivered_at(&self) -> Option<Timestamp> {
        self.delivered_at
    }

    /// Get the cancellation timestamp.
    #[must_use]
    pub const fn cancelled_at(&self) -> Option<Timestamp> {
        self.cancelled_at
    }

    /// Get the cancellation reason.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        self.cancel_reason.as_ref()
    }

    /// Get the seller notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Get the stored version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Set the stored version. Only repositories call this.
    pub const fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Sum of booked refunds.
    #[must_use]
    pub fn refunded_total(&self) -> Money {
        self.refunds.iter().map(|r| r.amount).sum()
    }

    /// Captured money not yet refunded; zero before payment.
    #[must_use]
    pub fn refundable_remaining(&self) -> Money {
        if !self.payment_status.has_been_paid() {
            return Money::ZERO;
        }
        self.totals.total_amount - self.refunded_total()
    }

    /// Estimated delivery date, once shipped.
    #[must_use]
    pub fn estimated_delivery(&self) -> Option<Timestamp> {
        self.shipped_at
            .map(|t| t.plus_days(self.shipping_method.delivery_offset_days()))
    }

    /// Latest lifecycle timestamp recorded on the order.
    #[must_use]
    pub fn latest_timestamp(&self) -> Timestamp {
        [self.paid_at, self.shipped_at, self.delivered_at, self.cancelled_at]
            .into_iter()
            .flatten()
            .chain(self.refunds.iter().map(|r| r.refunded_at))
            .fold(self.created_at, Timestamp::max)
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Apply a plan produced by the state machine.
    ///
    /// Settlement is checked in full before any field changes, so a failed
    /// apply leaves the order untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the order moved since the plan was
    /// made, `PaymentNotConfirmed`/`PolicyViolation` for a missing or
    /// mismatched payment, and `RefundFailed` for a missing or mismatched
    /// refund receipt.
    pub fn apply_transition(
        &mut self,
        plan: &TransitionPlan,
        settlement: Settlement,
    ) -> Result<(), OrderError> {
        if plan.from != self.status {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                event: plan.event,
            });
        }
        let at = plan.effective_at;

        match &plan.action {
            PlannedAction::ConfirmPayment { expected_amount } => {
                let payment = self.checked_payment(settlement.payment, *expected_amount)?;
                self.status = OrderStatus::Paid;
                self.payment_status = PaymentStatus::Completed;
                self.paid_at = Some(at);
                self.payment_reference = Some(payment.transaction_id.clone());
                self.events.push(OrderEvent::Paid(OrderPaid {
                    order_id: self.id.clone(),
                    payment_reference: payment.transaction_id,
                    amount: payment.amount,
                    occurred_at: at,
                }));
            }
            PlannedAction::BeginProcessing => {
                self.status = OrderStatus::Processing;
                self.events
                    .push(OrderEvent::ProcessingStarted(OrderProcessingStarted {
                        order_id: self.id.clone(),
                        occurred_at: at,
                    }));
            }
            PlannedAction::Ship {
                tracking_number,
                estimated_delivery,
            } => {
                self.status = OrderStatus::Shipped;
                self.shipped_at = Some(at);
                self.tracking_number = Some(tracking_number.clone());
                self.events.push(OrderEvent::Shipped(OrderShipped {
                    order_id: self.id.clone(),
                    tracking_number: tracking_number.clone(),
                    estimated_delivery: *estimated_delivery,
                    occurred_at: at,
                }));
            }
            PlannedAction::Deliver => {
                self.status = OrderStatus::Delivered;
                self.delivered_at = Some(at);
                self.events.push(OrderEvent::Delivered(OrderDelivered {
                    order_id: self.id.clone(),
                    occurred_at: at,
                }));
            }
            PlannedAction::Cancel { reason, refund_due } => {
                let refund = match refund_due {
                    Some(due) => Some(self.checked_refund(settlement.refund, *due)?),
                    None => None,
                };
                let refunded_amount = refund.as_ref().map_or(Money::ZERO, |r| r.amount);
                if let Some(receipt) = refund {
                    self.book_refund(receipt, reason.message.clone(), at);
                }
                let previous_status = self.status;
                self.status = OrderStatus::Cancelled;
                self.cancelled_at = Some(at);
                self.cancel_reason = Some(reason.clone());
                self.events.push(OrderEvent::Cancelled(OrderCancelled {
                    order_id: self.id.clone(),
                    previous_status,
                    reason: reason.clone(),
                    refunded_amount,
                    occurred_at: at,
                }));
            }
            PlannedAction::Refund { amount, reason } => {
                let receipt = self.checked_refund(settlement.refund, *amount)?;
                self.book_refund(receipt, reason.clone(), at);
            }
        }

        self.updated_at = self.updated_at.max(at);
        Ok(())
    }

    /// Book a refund the gateway already processed for an earlier request
    /// whose answer never reached the order. The status does not change.
    ///
    /// # Errors
    ///
    /// Returns `RefundFailed` if the order was never paid, or the receipt
    /// amount is not positive or exceeds what is still refundable.
    pub fn book_recovered_refund(
        &mut self,
        receipt: RefundReceipt,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        let remaining = self.refundable_remaining();
        if self.paid_at.is_none() || !receipt.amount.is_positive() || receipt.amount > remaining {
            return Err(OrderError::RefundFailed {
                order_id: self.id.to_string(),
                message: format!(
                    "gateway replayed a refund of {} with {remaining} refundable",
                    receipt.amount
                ),
            });
        }
        let at = now.max(self.latest_timestamp());
        self.book_refund(receipt, "recovered gateway refund".to_string(), at);
        self.updated_at = self.updated_at.max(at);
        Ok(())
    }

    // ========================================================================
    // Seller Edits
    // ========================================================================

    /// Replace the seller notes. Allowed in every status.
    pub fn update_notes(&mut self, notes: impl Into<String>, now: Timestamp) {
        self.notes = notes.into();
        self.updated_at = self.updated_at.max(now);
    }

    /// Set or replace the shipping address while `pending`.
    ///
    /// # Errors
    ///
    /// Returns `OrderLocked` after `pending`, or `InvalidParameters` for an
    /// incomplete address.
    pub fn update_shipping_address(
        &mut self,
        address: ShippingAddress,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;
        address.validate()?;
        self.shipping_address = Some(address);
        self.updated_at = self.updated_at.max(now);
        Ok(())
    }

    /// Replace the line items while `pending` and reprice under `policy`.
    ///
    /// # Errors
    ///
    /// Returns `OrderLocked` after `pending`, or `InvalidParameters` for
    /// invalid items.
    pub fn replace_items(
        &mut self,
        items: Vec<LineItem>,
        policy: &BusinessPolicy,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;
        validate_items(&items)?;
        let (totals, pricing) = OrderTotals::compute(&items, self.shipping_method, policy)?;
        self.items = items;
        self.totals = totals;
        self.pricing = pricing;
        self.updated_at = self.updated_at.max(now);
        Ok(())
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Check every aggregate invariant.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` naming the first broken rule.
    pub fn verify_invariants(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::invariant("items non-empty", "items=[]"));
        }

        let line_sum = self
            .items
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>, _>>()
            .and_then(Money::checked_sum)
            .map_err(|e| OrderError::invariant("subtotal == sum(unit_price * quantity)", e.to_string()))?;
        if line_sum != self.totals.subtotal {
            return Err(OrderError::invariant(
                "subtotal == sum(unit_price * quantity)",
                format!("subtotal={}, lines={line_sum}", self.totals.subtotal),
            ));
        }

        if !self.totals.is_balanced() {
            return Err(OrderError::invariant(
                "total == subtotal + shipping + tax",
                format!(
                    "total={}, subtotal={}, shipping={}, tax={}",
                    self.totals.total_amount,
                    self.totals.subtotal,
                    self.totals.shipping_cost,
                    self.totals.tax_amount
                ),
            ));
        }

        if self.paid_at.is_some() != self.payment_status.has_been_paid() {
            return Err(OrderError::invariant(
                "paid_at set iff payment_status != unpaid",
                format!(
                    "paid_at={:?}, payment_status={}",
                    self.paid_at, self.payment_status
                ),
            ));
        }

        if self.tracking_number.is_some() != self.shipped_at.is_some() {
            return Err(OrderError::invariant(
                "tracking_number set iff shipped_at set",
                format!(
                    "tracking_number={:?}, shipped_at={:?}",
                    self.tracking_number, self.shipped_at
                ),
            ));
        }

        self.verify_status_stamps()?;
        self.verify_timestamps_monotone()?;
        self.verify_refunds()
    }

    fn verify_status_stamps(&self) -> Result<(), OrderError> {
        let (needs_paid, needs_shipped, needs_delivered) = match self.status {
            OrderStatus::Pending => (false, false, false),
            OrderStatus::Paid | OrderStatus::Processing => (true, false, false),
            OrderStatus::Shipped => (true, true, false),
            OrderStatus::Delivered => (true, true, true),
            OrderStatus::Cancelled => {
                if self.cancelled_at.is_none() || self.cancel_reason.is_none() {
                    return Err(OrderError::invariant(
                        "cancelled order records cancelled_at and reason",
                        format!("cancelled_at={:?}", self.cancelled_at),
                    ));
                }
                return Ok(());
            }
        };

        let consistent = self.paid_at.is_some() == needs_paid
            && self.shipped_at.is_some() == needs_shipped
            && self.delivered_at.is_some() == needs_delivered
            && self.cancelled_at.is_none();
        if consistent {
            Ok(())
        } else {
            Err(OrderError::invariant(
                "lifecycle timestamps match status",
                format!(
                    "status={}, paid_at={:?}, shipped_at={:?}, delivered_at={:?}, cancelled_at={:?}",
                    self.status, self.paid_at, self.shipped_at, self.delivered_at, self.cancelled_at
                ),
            ))
        }
    }

    fn verify_timestamps_monotone(&self) -> Result<(), OrderError> {
        let mut previous = self.created_at;
        for stamp in [self.paid_at, self.shipped_at, self.delivered_at, self.cancelled_at]
            .into_iter()
            .flatten()
        {
            if stamp < previous {
                return Err(OrderError::invariant(
                    "lifecycle timestamps are non-decreasing",
                    format!("{stamp} precedes {previous}"),
                ));
            }
            previous = stamp;
        }
        Ok(())
    }

    fn verify_refunds(&self) -> Result<(), OrderError> {
        let refunded = self.refunded_total();
        let total = self.totals.total_amount;
        if refunded > total {
            return Err(OrderError::invariant(
                "sum(refunds) <= total",
                format!("refunded={refunded}, total={total}"),
            ));
        }

        let expected = if !self.payment_status.has_been_paid() {
            PaymentStatus::Unpaid
        } else if refunded.is_zero() {
            PaymentStatus::Completed
        } else if refunded == total {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        if expected != self.payment_status || (!refunded.is_zero() && self.paid_at.is_none()) {
            return Err(OrderError::invariant(
                "payment_status matches refunds",
                format!(
                    "payment_status={}, refunded={refunded}, total={total}",
                    self.payment_status
                ),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Drain accumulated domain events.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get pending events without draining.
    #[must_use]
    pub fn pending_events(&self) -> &[OrderEvent] {
        &self.events
    }

    // ========================================================================
    // Private Helpers
    // ========================================================================

    const fn ensure_pending(&self) -> Result<(), OrderError> {
        if matches!(self.status, OrderStatus::Pending) {
            Ok(())
        } else {
            Err(OrderError::OrderLocked {
                status: self.status,
            })
        }
    }

    fn checked_payment(
        &self,
        payment: Option<PaymentConfirmation>,
        expected: Money,
    ) -> Result<PaymentConfirmation, OrderError> {
        let payment = payment.ok_or_else(|| OrderError::PaymentNotConfirmed {
            order_id: self.id.to_string(),
            message: "no confirmation supplied".to_string(),
        })?;
        if payment.amount != expected {
            return Err(OrderError::policy(
                "payment_amount_mismatch",
                format!("gateway confirmed {}, order total is {expected}", payment.amount),
            ));
        }
        Ok(payment)
    }

    fn checked_refund(
        &self,
        refund: Option<RefundReceipt>,
        expected: Money,
    ) -> Result<RefundReceipt, OrderError> {
        let receipt = refund.ok_or_else(|| OrderError::RefundFailed {
            order_id: self.id.to_string(),
            message: "no refund receipt supplied".to_string(),
        })?;
        if receipt.amount != expected {
            return Err(OrderError::RefundFailed {
                order_id: self.id.to_string(),
                message: format!("gateway refunded {}, expected {expected}", receipt.amount),
            });
        }
        Ok(receipt)
    }

    fn book_refund(&mut self, receipt: RefundReceipt, reason: String, at: Timestamp) {
        self.refunds.push(RefundRecord {
            refund_id: receipt.refund_id.clone(),
            amount: receipt.amount,
            reason,
            refunded_at: at,
        });
        let remaining = self.refundable_remaining();
        self.payment_status = if remaining.is_zero() {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        self.events.push(OrderEvent::Refunded(OrderRefunded {
            order_id: self.id.clone(),
            refund_id: receipt.refund_id,
            amount: receipt.amount,
            remaining_refundable: remaining,
            occurred_at: at,
        }));
    }
}
