//! Transition Table Tests
//!
//! Every (status, event) pair either realizes its single table edge or is
//! rejected with `InvalidTransition` and leaves the stored order untouched.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{Harness, t0};
use fulfillment_engine::domain::order_management::{
    CancelReason, FulfillmentEvent, OrderError, OrderStatus,
};
use test_case::test_case;

fn cancel() -> FulfillmentEvent {
    FulfillmentEvent::cancel(CancelReason::customer_requested())
}

fn refund() -> FulfillmentEvent {
    FulfillmentEvent::refund(None, "wrong blend")
}

#[test_case(OrderStatus::Pending, FulfillmentEvent::PaymentConfirmed, Some(OrderStatus::Paid) ; "pending pays")]
#[test_case(OrderStatus::Pending, cancel(), Some(OrderStatus::Cancelled) ; "pending cancels")]
#[test_case(OrderStatus::Pending, FulfillmentEvent::BeginProcessing, None ; "pending cannot process")]
#[test_case(OrderStatus::Pending, FulfillmentEvent::ship("1Z1"), None ; "pending cannot ship")]
#[test_case(OrderStatus::Pending, FulfillmentEvent::Deliver, None ; "pending cannot deliver")]
#[test_case(OrderStatus::Pending, refund(), None ; "pending cannot refund")]
#[test_case(OrderStatus::Paid, FulfillmentEvent::BeginProcessing, Some(OrderStatus::Processing) ; "paid processes")]
#[test_case(OrderStatus::Paid, cancel(), Some(OrderStatus::Cancelled) ; "paid cancels")]
#[test_case(OrderStatus::Paid, FulfillmentEvent::PaymentConfirmed, None ; "paid cannot pay twice")]
#[test_case(OrderStatus::Paid, FulfillmentEvent::ship("1Z1"), None ; "paid cannot skip processing")]
#[test_case(OrderStatus::Paid, FulfillmentEvent::Deliver, None ; "paid cannot deliver")]
#[test_case(OrderStatus::Processing, FulfillmentEvent::ship("1Z1"), Some(OrderStatus::Shipped) ; "processing ships")]
#[test_case(OrderStatus::Processing, cancel(), Some(OrderStatus::Cancelled) ; "processing cancels")]
#[test_case(OrderStatus::Processing, FulfillmentEvent::Deliver, None ; "processing cannot deliver")]
#[test_case(OrderStatus::Processing, refund(), None ; "processing cannot refund")]
#[test_case(OrderStatus::Shipped, FulfillmentEvent::Deliver, Some(OrderStatus::Delivered) ; "shipped delivers")]
#[test_case(OrderStatus::Shipped, cancel(), Some(OrderStatus::Cancelled) ; "shipped cancels")]
#[test_case(OrderStatus::Shipped, FulfillmentEvent::ship("1Z2"), None ; "shipped cannot ship twice")]
#[test_case(OrderStatus::Shipped, refund(), None ; "shipped cannot refund")]
#[test_case(OrderStatus::Delivered, refund(), Some(OrderStatus::Delivered) ; "delivered refunds")]
#[test_case(OrderStatus::Delivered, cancel(), None ; "delivered cannot cancel")]
#[test_case(OrderStatus::Delivered, FulfillmentEvent::Deliver, None ; "delivered cannot deliver twice")]
#[test_case(OrderStatus::Delivered, FulfillmentEvent::PaymentConfirmed, None ; "delivered cannot pay")]
#[test_case(OrderStatus::Cancelled, FulfillmentEvent::PaymentConfirmed, None ; "cancelled cannot pay")]
#[test_case(OrderStatus::Cancelled, FulfillmentEvent::BeginProcessing, None ; "cancelled cannot process")]
#[test_case(OrderStatus::Cancelled, cancel(), None ; "cancelled cannot cancel twice")]
#[test_case(OrderStatus::Cancelled, refund(), None ; "cancelled cannot refund")]
#[tokio::test]
async fn transition_table(from: OrderStatus, event: FulfillmentEvent, expected: Option<OrderStatus>) {
    let harness = Harness::new();
    let order = harness.order_in(from).await;
    let id = order.id().clone();
    let kind = event.kind();

    let result = harness.apply(&id, event, t0().plus_days(1)).await;

    match expected {
        Some(to) => {
            let updated = result.unwrap();
            assert_eq!(updated.status(), to);
            assert_eq!(updated.version(), order.version() + 1);
            updated.verify_invariants().unwrap();
        }
        None => {
            assert_eq!(
                result.unwrap_err(),
                OrderError::InvalidTransition { from, event: kind }
            );
            let stored = harness.stored(&id);
            assert_eq!(stored.status(), from);
            assert_eq!(stored.version(), order.version());
        }
    }
}
