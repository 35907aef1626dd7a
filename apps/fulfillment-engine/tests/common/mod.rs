//! Shared harness for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use fulfillment_engine::application::services::OrderLocks;
use fulfillment_engine::application::use_cases::{
    CreateOrderUseCase, TransitionCommand, TransitionOrderUseCase,
};
use fulfillment_engine::domain::order_management::{
    CancelReason, CreateOrderCommand, CustomerSnapshot, FulfillmentEvent, LineItem, Order,
    OrderError, OrderStatus, ShippingAddress, ShippingMethod,
};
use fulfillment_engine::domain::policy::BusinessPolicy;
use fulfillment_engine::domain::shared::{Money, OrderId, Quantity, Timestamp};
use fulfillment_engine::infrastructure::notification::RecordingNotifier;
use fulfillment_engine::infrastructure::payment::SimulatedPaymentGateway;
use fulfillment_engine::infrastructure::persistence::InMemoryOrderRepository;

pub type Transitions =
    TransitionOrderUseCase<SimulatedPaymentGateway, RecordingNotifier, InMemoryOrderRepository>;

/// 2026-03-01T10:00:00Z
pub fn t0() -> Timestamp {
    Timestamp::parse("2026-03-01T10:00:00Z").unwrap()
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        recipient: "Mira Okafor".to_string(),
        line1: "48 Linden Street".to_string(),
        line2: Some("Unit 3".to_string()),
        city: "Asheville".to_string(),
        region: Some("NC".to_string()),
        postal_code: "28801".to_string(),
        country: "US".to_string(),
    }
}

/// Chamomile x2 at 24.99 and ashwagandha x1 at 34.99, standard shipping.
pub fn herbal_basket() -> CreateOrderCommand {
    CreateOrderCommand {
        customer: CustomerSnapshot::new("Mira Okafor", "mira@example.com"),
        items: vec![
            LineItem::new(
                "chamomile",
                "Chamomile Flowers 50g",
                Money::from_minor(2499),
                Quantity::new(2).unwrap(),
            ),
            LineItem::new(
                "ashwagandha",
                "Ashwagandha Root Powder",
                Money::from_minor(3499),
                Quantity::ONE,
            ),
        ],
        shipping_address: Some(address()),
        shipping_method: ShippingMethod::Standard,
        notes: None,
    }
}

/// In-memory engine wired with the simulated gateway and a recording notifier.
pub struct Harness {
    pub repo: Arc<InMemoryOrderRepository>,
    pub payment: Arc<SimulatedPaymentGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub locks: Arc<OrderLocks>,
    pub create: CreateOrderUseCase<InMemoryOrderRepository, RecordingNotifier>,
    pub transitions: Arc<Transitions>,
    pub policy: BusinessPolicy,
    pub refund_timeout: Duration,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_gateway(SimulatedPaymentGateway::new())
    }

    pub fn with_gateway(gateway: SimulatedPaymentGateway) -> Self {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let payment = Arc::new(gateway);
        let notifier = Arc::new(RecordingNotifier::new());
        let locks = Arc::new(OrderLocks::new());
        let create = CreateOrderUseCase::new(Arc::clone(&repo), Arc::clone(&notifier));
        let transitions = Arc::new(TransitionOrderUseCase::new(
            Arc::clone(&payment),
            Arc::clone(&notifier),
            Arc::clone(&repo),
            Arc::clone(&locks),
        ));
        Self {
            repo,
            payment,
            notifier,
            locks,
            create,
            transitions,
            policy: BusinessPolicy::default(),
            refund_timeout: Duration::from_millis(250),
        }
    }

    pub async fn create_at(&self, now: Timestamp) -> Order {
        self.create
            .execute(herbal_basket(), &self.policy, now)
            .await
            .unwrap()
    }

    pub fn command(&self, id: &OrderId, event: FulfillmentEvent, now: Timestamp) -> TransitionCommand {
        TransitionCommand {
            order_id: id.clone(),
            event,
            policy: self.policy.clone(),
            now,
            refund_timeout: self.refund_timeout,
            expected_version: None,
            expected_status: None,
        }
    }

    pub async fn apply(
        &self,
        id: &OrderId,
        event: FulfillmentEvent,
        now: Timestamp,
    ) -> Result<Order, OrderError> {
        self.transitions.execute(self.command(id, event, now)).await
    }

    pub fn stored(&self, id: &OrderId) -> Order {
        self.repo.get(id).unwrap().expect("order is stored")
    }

    /// Create an order at `t0` and walk it forward one hour per step until
    /// it reaches `target`.
    pub async fn order_in(&self, target: OrderStatus) -> Order {
        let mut order = self.create_at(t0()).await;
        let id = order.id().clone();
        for (step, event) in path_to(target).into_iter().enumerate() {
            order = self
                .apply(&id, event, t0().plus_hours(step as i64 + 1))
                .await
                .unwrap();
        }
        assert_eq!(order.status(), target);
        order
    }
}

/// Events that take a fresh pending order to `target`.
pub fn path_to(target: OrderStatus) -> Vec<FulfillmentEvent> {
    let forward = [
        FulfillmentEvent::PaymentConfirmed,
        FulfillmentEvent::BeginProcessing,
        FulfillmentEvent::ship("1Z999AA10123456784"),
        FulfillmentEvent::Deliver,
    ];
    let steps = match target {
        OrderStatus::Pending => 0,
        OrderStatus::Paid => 1,
        OrderStatus::Processing => 2,
        OrderStatus::Shipped => 3,
        OrderStatus::Delivered => 4,
        OrderStatus::Cancelled => {
            return vec![FulfillmentEvent::cancel(CancelReason::customer_requested())];
        }
    };
    forward.into_iter().take(steps).collect()
}

/// Wait for the spawned notification tasks of `id` to land, up to one second.
pub async fn notifications_for(
    notifier: &RecordingNotifier,
    id: &OrderId,
    expected: usize,
) -> Vec<fulfillment_engine::domain::order_management::OrderEventKind> {
    for _ in 0..100 {
        let kinds = notifier.kinds_for(id);
        if kinds.len() >= expected {
            return kinds;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    notifier.kinds_for(id)
}
