//! Concurrent transition tests.
//!
//! Transitions on one order are serialized by the per-order lock. Each
//! request is bound to the status it was issued against, and optionally to
//! a version, so it loses cleanly when another request commits first.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use common::{Harness, t0};
use fulfillment_engine::domain::order_management::{
    CancelReason, FulfillmentEvent, OrderError, OrderStatus,
};
use fulfillment_engine::domain::shared::Money;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ship_racing_cancel_has_exactly_one_winner() {
    for _ in 0..25 {
        let harness = Arc::new(Harness::new());
        let processing = harness.order_in(OrderStatus::Processing).await;
        let id = processing.id().clone();
        let now = t0().plus_hours(6);

        let mut ship = harness.command(&id, FulfillmentEvent::ship("1Z999AA1"), now);
        ship.expected_version = Some(processing.version());
        let mut cancel = harness.command(
            &id,
            FulfillmentEvent::cancel(CancelReason::seller_requested("stock issue")),
            now,
        );
        cancel.expected_version = Some(processing.version());

        let shipper = {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move { harness.transitions.execute(ship).await })
        };
        let canceller = {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move { harness.transitions.execute(cancel).await })
        };
        let shipped = shipper.await.unwrap();
        let cancelled = canceller.await.unwrap();

        assert!(
            shipped.is_ok() ^ cancelled.is_ok(),
            "exactly one must win: ship={shipped:?} cancel={cancelled:?}"
        );
        let loser = if shipped.is_ok() { cancelled } else { shipped };
        assert!(matches!(
            loser,
            Err(OrderError::ConcurrentWriteConflict { .. } | OrderError::InvalidTransition { .. })
        ));

        let stored = harness.stored(&id);
        assert_eq!(stored.version(), processing.version() + 1);
        stored.verify_invariants().unwrap();
        match stored.status() {
            OrderStatus::Shipped => assert!(harness.payment.refund_log().is_empty()),
            OrderStatus::Cancelled => assert_eq!(harness.payment.refund_log().len(), 1),
            other => panic!("unexpected status {other}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ship_and_cancel_issued_together_without_versions() {
    let harness = Arc::new(Harness::new());
    let processing = harness.order_in(OrderStatus::Processing).await;
    let id = processing.id().clone();
    let now = t0().plus_hours(6);

    // Hold the order so both requests arrive while it is still processing.
    let gate = harness.locks.acquire(&id).await;
    let shipper = {
        let harness = Arc::clone(&harness);
        let id = id.clone();
        tokio::spawn(async move {
            harness
                .apply(&id, FulfillmentEvent::ship("1Z999AA1"), now)
                .await
        })
    };
    let canceller = {
        let harness = Arc::clone(&harness);
        let id = id.clone();
        tokio::spawn(async move {
            harness
                .apply(
                    &id,
                    FulfillmentEvent::cancel(CancelReason::seller_requested("stock issue")),
                    now,
                )
                .await
        })
    };
    tokio::time::timeout(Duration::from_secs(5), async {
        while harness.locks.holders(&id) < 3 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("both requests queue on the order");
    drop(gate);

    let shipped = shipper.await.unwrap();
    let cancelled = canceller.await.unwrap();

    assert!(
        shipped.is_ok() ^ cancelled.is_ok(),
        "exactly one must win: ship={shipped:?} cancel={cancelled:?}"
    );
    let loser = if shipped.is_ok() { cancelled } else { shipped };
    assert!(matches!(loser, Err(OrderError::InvalidTransition { .. })));

    let stored = harness.stored(&id);
    assert_eq!(stored.version(), processing.version() + 1);
    if stored.status() == OrderStatus::Shipped {
        assert!(harness.payment.refund_log().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_duplicate_cancels_refund_once() {
    let harness = Arc::new(Harness::new());
    let paid = harness.order_in(OrderStatus::Paid).await;
    let id = paid.id().clone();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let harness = Arc::clone(&harness);
            let id = id.clone();
            tokio::spawn(async move {
                harness
                    .apply(
                        &id,
                        FulfillmentEvent::cancel(CancelReason::customer_requested()),
                        t0().plus_hours(4),
                    )
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for outcome in join_all(handles).await {
        match outcome.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(matches!(e, OrderError::InvalidTransition { .. }), "{e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(harness.payment.refund_log().len(), 1);
    assert_eq!(harness.payment.refunded_for(&id), Money::from_minor(9677));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_orders_progress_independently() {
    let harness = Arc::new(Harness::new());
    let mut ids = Vec::new();
    for _ in 0..10 {
        ids.push(harness.create_at(t0()).await.id().clone());
    }

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move {
                harness
                    .apply(&id, FulfillmentEvent::PaymentConfirmed, t0().plus_hours(1))
                    .await
            })
        })
        .collect();
    for outcome in join_all(handles).await {
        outcome.unwrap().unwrap();
    }

    for id in &ids {
        assert_eq!(harness.stored(id).status(), OrderStatus::Paid);
    }
    assert_eq!(harness.locks.active(), 0);
}
