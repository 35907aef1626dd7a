//! Order State Machine Service
//!
//! The transition table is the single authority for status changes. Guards
//! are evaluated into a [`TransitionPlan`] before anything is mutated; the
//! aggregate then applies the plan together with the collaborator results.

use crate::domain::order_management::aggregate::Order;
use crate::domain::order_management::errors::OrderError;
use crate::domain::order_management::value_objects::{
    CancelReason, FulfillmentEvent, FulfillmentEventKind, OrderStatus,
};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{Money, Timestamp};

/// Inputs every guard may consult besides the order itself.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// Policy in effect for this request.
    pub policy: &'a BusinessPolicy,
    /// Caller-supplied clock.
    pub now: Timestamp,
}

impl<'a> TransitionContext<'a> {
    /// Create a new context.
    #[must_use]
    pub const fn new(policy: &'a BusinessPolicy, now: Timestamp) -> Self {
        Self { policy, now }
    }
}

/// What the aggregate must do once collaborators have answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Record a captured payment of exactly `expected_amount`.
    ConfirmPayment {
        /// The order total the gateway must confirm.
        expected_amount: Money,
    },
    /// Move to processing.
    BeginProcessing,
    /// Record shipment.
    Ship {
        /// Trimmed carrier tracking number.
        tracking_number: String,
        /// Shipment date plus the method's delivery offset.
        estimated_delivery: Timestamp,
    },
    /// Record delivery.
    Deliver,
    /// Cancel, after refunding `refund_due` if present.
    Cancel {
        /// Why the order is cancelled.
        reason: CancelReason,
        /// Remaining refundable amount to return first.
        refund_due: Option<Money>,
    },
    /// Book a refund without changing status.
    Refund {
        /// Amount to return.
        amount: Money,
        /// Free-text reason.
        reason: String,
    },
}

/// Validated outcome of the guards for one requested event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Status the plan was computed against.
    pub from: OrderStatus,
    /// Status after the plan is applied.
    pub to: OrderStatus,
    /// Requested event.
    pub event: FulfillmentEventKind,
    /// Timestamp stamped on the order; never earlier than any existing stamp.
    pub effective_at: Timestamp,
    /// Mutation to perform.
    pub action: PlannedAction,
}

impl TransitionPlan {
    /// Returns true if the gateway must confirm payment before applying.
    #[must_use]
    pub const fn requires_payment_confirmation(&self) -> bool {
        matches!(self.action, PlannedAction::ConfirmPayment { .. })
    }

    /// Amount the gateway must refund before applying, if any.
    #[must_use]
    pub const fn refund_due(&self) -> Option<Money> {
        match &self.action {
            PlannedAction::Cancel { refund_due, .. } => *refund_due,
            PlannedAction::Refund { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Look up the target status for `(from, event)`.
    #[must_use]
    pub const fn target(from: OrderStatus, event: FulfillmentEventKind) -> Option<OrderStatus> {
        use FulfillmentEventKind as E;
        use OrderStatus as S;

        match (from, event) {
            (S::Pending, E::PaymentConfirmed) => Some(S::Paid),
            (S::Paid, E::BeginProcessing) => Some(S::Processing),
            (S::Processing, E::Ship) => Some(S::Shipped),
            (S::Shipped, E::Deliver) => Some(S::Delivered),
            (S::Pending | S::Paid | S::Processing | S::Shipped, E::Cancel) => Some(S::Cancelled),
            (S::Delivered, E::RefundRequest) => Some(S::Delivered),
            _ => None,
        }
    }

    /// Check if an event is accepted in a status (guards aside).
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, event: FulfillmentEventKind) -> bool {
        Self::target(from, event).is_some()
    }

    /// Validate an event against the table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if no edge matches.
    pub fn validate_transition(
        from: OrderStatus,
        event: FulfillmentEventKind,
    ) -> Result<OrderStatus, OrderError> {
        Self::target(from, event).ok_or(OrderError::InvalidTransition { from, event })
    }

    /// Events a caller may offer for an order in `status`.
    #[must_use]
    pub fn valid_events(status: OrderStatus) -> Vec<FulfillmentEventKind> {
        FulfillmentEventKind::ALL
            .into_iter()
            .filter(|event| Self::is_valid_transition(status, *event))
            .collect()
    }

    /// Statuses reachable in one step from `from`.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        let mut next: Vec<OrderStatus> = FulfillmentEventKind::ALL
            .into_iter()
            .filter_map(|event| Self::target(from, event))
            .filter(|to| *to != from)
            .collect();
        next.sort();
        next.dedup();
        next
    }

    /// Evaluate every guard for `event` against `order` without mutating it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when no edge matches, `PolicyViolation`
    /// or `InvalidParameters` when a guard fails.
    pub fn plan(
        order: &Order,
        event: &FulfillmentEvent,
        ctx: &TransitionContext<'_>,
    ) -> Result<TransitionPlan, OrderError> {
        let from = order.status();
        let kind = event.kind();
        let to = Self::validate_transition(from, kind)?;
        let effective_at = ctx.now.max(order.latest_timestamp());

        let action = match event {
            FulfillmentEvent::PaymentConfirmed => {
                Self::require_shipping_address(order, "payment")?;
                let total = order.totals().total_amount;
                if !ctx.policy.is_within_order_bounds(total) {
                    return Err(OrderError::policy(
                        "order_amount_bounds",
                        format!(
                            "total {total} is outside [{}, {}]",
                            ctx.policy.min_order_amount, ctx.policy.max_order_amount
                        ),
                    ));
                }
                PlannedAction::ConfirmPayment {
                    expected_amount: total,
                }
            }
            FulfillmentEvent::BeginProcessing => PlannedAction::BeginProcessing,
            FulfillmentEvent::Ship { tracking_number } => {
                Self::require_shipping_address(order, "shipment")?;
                let tracking_number = tracking_number.trim();
                if tracking_number.is_empty() {
                    return Err(OrderError::invalid(
                        "tracking_number",
                        "a tracking number is required to ship",
                    ));
                }
                PlannedAction::Ship {
                    tracking_number: tracking_number.to_string(),
                    estimated_delivery: effective_at
                        .plus_days(order.shipping_method().delivery_offset_days()),
                }
            }
            FulfillmentEvent::Deliver => PlannedAction::Deliver,
            FulfillmentEvent::Cancel { reason } => {
                if from == OrderStatus::Shipped {
                    let paid_at = order.paid_at().ok_or_else(|| {
                        OrderError::invariant("shipped order has paid_at", "paid_at=None")
                    })?;
                    Self::require_within_refund_window(ctx, paid_at, "paid_at")?;
                }
                let remaining = order.refundable_remaining();
                let refund_due = (order.payment_status().is_refundable()
                    && remaining.is_positive())
                .then_some(remaining);
                PlannedAction::Cancel {
                    reason: reason.clone(),
                    refund_due,
                }
            }
            FulfillmentEvent::RefundRequest { amount, reason } => {
                let delivered_at = order.delivered_at().ok_or_else(|| {
                    OrderError::invariant("delivered order has delivered_at", "delivered_at=None")
                })?;
                Self::require_within_refund_window(ctx, delivered_at, "delivered_at")?;
                if !order.payment_status().is_refundable() {
                    return Err(OrderError::policy(
                        "payment_not_refundable",
                        format!("payment status is {}", order.payment_status()),
                    ));
                }
                let remaining = order.refundable_remaining();
                let amount = amount.unwrap_or(remaining);
                if !amount.is_positive() || amount > remaining {
                    return Err(OrderError::policy(
                        "refund_amount",
                        format!("refund {amount} must be positive and at most {remaining}"),
                    ));
                }
                PlannedAction::Refund {
                    amount,
                    reason: reason.clone(),
                }
            }
        };

        Ok(TransitionPlan {
            from,
            to,
            event: kind,
            effective_at,
            action,
        })
    }

    fn require_shipping_address(order: &Order, purpose: &str) -> Result<(), OrderError> {
        if order.shipping_address().is_none() {
            return Err(OrderError::policy(
                "shipping_address_required",
                format!("a shipping address is required before {purpose}"),
            ));
        }
        Ok(())
    }

    // Closed window: exactly max_refund_days after the anchor is still accepted.
    fn require_within_refund_window(
        ctx: &TransitionContext<'_>,
        anchor: Timestamp,
        anchor_name: &str,
    ) -> Result<(), OrderError> {
        let elapsed = ctx.now.duration_since(anchor);
        if elapsed > ctx.policy.refund_window() {
            return Err(OrderError::policy(
                "refund_window_expired",
                format!(
                    "{} days since {anchor_name} exceeds the {}-day refund window",
                    elapsed.num_days(),
                    ctx.policy.max_refund_days
                ),
            ));
        }
        Ok(())
    }
}
