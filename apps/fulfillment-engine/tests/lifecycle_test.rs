//! Order Lifecycle Integration Tests
//!
//! Drive orders through the transition use case against the in-memory
//! repository and the simulated payment gateway:
//! - Checkout pricing
//! - The happy path from payment to a full refund
//! - Cancellation refunds, refund windows and gateway failures
//! - Recovering refunds whose gateway answer was lost

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::unreadable_literal)]

mod common;

use std::time::Duration;

use common::{Harness, notifications_for, t0};
use fulfillment_engine::application::ports::PaymentPort;
use fulfillment_engine::domain::order_management::{
    CancelReason, FulfillmentEvent, Order, OrderError, OrderEventKind, OrderStatus,
    PaymentStatus, RefundRequest,
};
use fulfillment_engine::domain::shared::Money;
use fulfillment_engine::infrastructure::payment::{RefundBehavior, SimulatedPaymentGateway};

// ============================================
// Checkout
// ============================================

#[tokio::test]
async fn test_checkout_pricing_scenario() {
    let harness = Harness::new();

    let order = harness.create_at(t0()).await;

    let totals = order.totals();
    assert_eq!(totals.subtotal, Money::from_minor(8497));
    assert_eq!(totals.tax_amount, Money::from_minor(680));
    assert_eq!(totals.shipping_cost, Money::from_minor(500));
    assert_eq!(totals.total_amount, Money::from_minor(9677));
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.payment_status(), PaymentStatus::Unpaid);
    assert!(order.order_number().is_well_formed());
    assert_eq!(order.pricing().policy_version, harness.policy.version);

    let kinds = notifications_for(&harness.notifier, order.id(), 1).await;
    assert_eq!(kinds, vec![OrderEventKind::Created]);
}

// ============================================
// Happy Path
// ============================================

#[tokio::test]
async fn test_full_lifecycle_with_partial_then_full_refund() {
    let harness = Harness::new();
    let delivered = harness.order_in(OrderStatus::Delivered).await;
    let id = delivered.id().clone();
    assert_eq!(delivered.tracking_number(), Some("1Z999AA10123456784"));
    assert!(delivered.estimated_delivery().is_some());

    let partial = harness
        .apply(
            &id,
            FulfillmentEvent::refund(Some(Money::from_minor(1000)), "crushed tin"),
            t0().plus_days(2),
        )
        .await
        .unwrap();
    assert_eq!(partial.status(), OrderStatus::Delivered);
    assert_eq!(partial.payment_status(), PaymentStatus::PartiallyRefunded);
    assert_eq!(partial.refundable_remaining(), Money::from_minor(8677));

    let full = harness
        .apply(
            &id,
            FulfillmentEvent::refund(None, "customer changed mind"),
            t0().plus_days(3),
        )
        .await
        .unwrap();
    assert_eq!(full.payment_status(), PaymentStatus::Refunded);
    assert_eq!(full.refunded_total(), Money::from_minor(9677));
    assert_eq!(harness.payment.refunded_for(&id), Money::from_minor(9677));

    let exhausted = harness
        .apply(&id, FulfillmentEvent::refund(None, "again"), t0().plus_days(4))
        .await;
    assert!(matches!(exhausted, Err(OrderError::PolicyViolation { .. })));

    let kinds = notifications_for(&harness.notifier, &id, 7).await;
    assert_eq!(
        kinds,
        vec![
            OrderEventKind::Created,
            OrderEventKind::Paid,
            OrderEventKind::ProcessingStarted,
            OrderEventKind::Shipped,
            OrderEventKind::Delivered,
            OrderEventKind::Refunded,
            OrderEventKind::Refunded,
        ]
    );
}

#[tokio::test]
async fn test_versions_advance_once_per_transition() {
    let harness = Harness::new();

    let created = harness.create_at(t0()).await;
    let paid = harness.order_in(OrderStatus::Paid).await;

    assert_eq!(created.version(), 1);
    assert_eq!(paid.version(), 2);
    assert_eq!(harness.stored(paid.id()).version(), 2);
}

// ============================================
// Cancellation
// ============================================

#[tokio::test]
async fn test_cancel_of_paid_order_refunds_full_total_first() {
    let harness = Harness::new();
    let paid = harness.order_in(OrderStatus::Paid).await;
    let id = paid.id().clone();

    let cancelled = harness
        .apply(
            &id,
            FulfillmentEvent::cancel(CancelReason::customer_requested()),
            t0().plus_hours(3),
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status(), OrderStatus::Cancelled);
    assert_eq!(cancelled.payment_status(), PaymentStatus::Refunded);
    assert_eq!(cancelled.refunds().len(), 1);

    let log = harness.payment.refund_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].amount, Money::from_minor(9677));
    assert_eq!(log[0].idempotency_key, format!("{id}:refund:1"));
}

#[tokio::test]
async fn test_cancel_of_pending_order_issues_no_refund() {
    let harness = Harness::new();
    let order = harness.create_at(t0()).await;

    let cancelled = harness
        .apply(
            order.id(),
            FulfillmentEvent::cancel(CancelReason::customer_requested()),
            t0().plus_hours(1),
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status(), OrderStatus::Cancelled);
    assert_eq!(cancelled.payment_status(), PaymentStatus::Unpaid);
    assert!(harness.payment.refund_log().is_empty());
}

#[tokio::test]
async fn test_declined_refund_keeps_order_open() {
    let harness = Harness::with_gateway(
        SimulatedPaymentGateway::new().with_refund_behavior(RefundBehavior::Decline),
    );
    let processing = harness.order_in(OrderStatus::Processing).await;
    let before = serde_json::to_value(harness.stored(processing.id())).unwrap();

    let result = harness
        .apply(
            processing.id(),
            FulfillmentEvent::cancel(CancelReason::seller_requested("out of stock")),
            t0().plus_hours(5),
        )
        .await;

    assert!(matches!(result, Err(OrderError::RefundFailed { .. })));
    assert_eq!(
        serde_json::to_value(harness.stored(processing.id())).unwrap(),
        before
    );
}

#[tokio::test]
async fn test_hanging_refund_reports_pending() {
    let mut harness = Harness::with_gateway(
        SimulatedPaymentGateway::new().with_refund_behavior(RefundBehavior::Hang),
    );
    harness.refund_timeout = Duration::from_millis(50);
    let paid = harness.order_in(OrderStatus::Paid).await;

    let result = harness
        .apply(
            paid.id(),
            FulfillmentEvent::cancel(CancelReason::customer_requested()),
            t0().plus_hours(2),
        )
        .await;

    assert!(matches!(result, Err(OrderError::RefundPending { .. })));
    assert_eq!(harness.stored(paid.id()).status(), OrderStatus::Paid);
}

/// The gateway processed refund #1 but its answer never reached the order.
async fn delivered_with_unbooked_refund(harness: &Harness) -> Order {
    let delivered = harness.order_in(OrderStatus::Delivered).await;
    harness
        .payment
        .refund(RefundRequest::new(
            delivered.id().clone(),
            Money::from_minor(1000),
            1,
        ))
        .await
        .unwrap();
    delivered
}

#[tokio::test]
async fn test_retry_after_lost_refund_answer_books_both_refunds() {
    let harness = Harness::new();
    let delivered = delivered_with_unbooked_refund(&harness).await;
    let id = delivered.id().clone();

    let refunded = harness
        .apply(&id, FulfillmentEvent::refund(None, "damaged"), t0().plus_days(1))
        .await
        .unwrap();

    assert_eq!(refunded.status(), OrderStatus::Delivered);
    assert_eq!(refunded.payment_status(), PaymentStatus::Refunded);
    let amounts: Vec<_> = refunded.refunds().iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![Money::from_minor(1000), Money::from_minor(8677)]);
    assert_eq!(harness.payment.refunded_for(&id), Money::from_minor(9677));

    let keys: Vec<_> = harness
        .payment
        .refund_log()
        .into_iter()
        .map(|r| r.idempotency_key)
        .collect();
    assert_eq!(keys, vec![format!("{id}:refund:1"), format!("{id}:refund:2")]);
    harness.stored(&id).verify_invariants().unwrap();
}

#[tokio::test]
async fn test_retry_with_other_amount_after_lost_refund_answer() {
    let harness = Harness::new();
    let delivered = delivered_with_unbooked_refund(&harness).await;
    let id = delivered.id().clone();

    let refunded = harness
        .apply(
            &id,
            FulfillmentEvent::refund(Some(Money::from_minor(500)), "one tin dented"),
            t0().plus_days(1),
        )
        .await
        .unwrap();

    assert_eq!(refunded.payment_status(), PaymentStatus::PartiallyRefunded);
    assert_eq!(refunded.refunded_total(), Money::from_minor(1500));
    assert_eq!(harness.payment.refunded_for(&id), Money::from_minor(1500));
    assert_eq!(harness.stored(&id).refunds().len(), 2);
}

// ============================================
// Refund Window
// ============================================

#[tokio::test]
async fn test_shipped_cancel_inside_refund_window_is_accepted() {
    let harness = Harness::new();
    let shipped = harness.order_in(OrderStatus::Shipped).await;

    let cancelled = harness
        .apply(
            shipped.id(),
            FulfillmentEvent::cancel(CancelReason::customer_requested()),
            t0().plus_days(29),
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status(), OrderStatus::Cancelled);
    assert_eq!(cancelled.refunded_total(), Money::from_minor(9677));
}

#[tokio::test]
async fn test_shipped_cancel_after_refund_window_is_rejected() {
    let harness = Harness::new();
    let shipped = harness.order_in(OrderStatus::Shipped).await;

    let result = harness
        .apply(
            shipped.id(),
            FulfillmentEvent::cancel(CancelReason::customer_requested()),
            t0().plus_days(31),
        )
        .await;

    assert!(matches!(
        result,
        Err(OrderError::PolicyViolation { ref rule, .. }) if rule == "refund_window_expired"
    ));
    assert_eq!(harness.stored(shipped.id()).status(), OrderStatus::Shipped);
    assert!(harness.payment.refund_log().is_empty());
}

// ============================================
// Payment
// ============================================

#[tokio::test]
async fn test_declined_payment_leaves_order_pending() {
    let harness = Harness::with_gateway(SimulatedPaymentGateway::new().declining_payments());
    let order = harness.create_at(t0()).await;

    let result = harness
        .apply(order.id(), FulfillmentEvent::PaymentConfirmed, t0().plus_hours(1))
        .await;

    assert!(matches!(result, Err(OrderError::PaymentNotConfirmed { .. })));
    let stored = harness.stored(order.id());
    assert_eq!(stored.status(), OrderStatus::Pending);
    assert_eq!(stored.payment_status(), PaymentStatus::Unpaid);
}
