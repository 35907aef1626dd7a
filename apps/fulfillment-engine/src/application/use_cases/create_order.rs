//! Create Order Use Case

use std::sync::Arc;

use crate::application::ports::NotificationPort;
use crate::application::services::dispatch_notifications;
use crate::domain::order_management::{CreateOrderCommand, Order, OrderError, OrderRepository};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{OrderNumber, Timestamp};

/// Attempts at drawing an unused order number before giving up.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Use case for checking out a new order in `pending`/`unpaid`.
pub struct CreateOrderUseCase<R, N>
where
    R: OrderRepository,
    N: NotificationPort + 'static,
{
    repo: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> CreateOrderUseCase<R, N>
where
    R: OrderRepository,
    N: NotificationPort + 'static,
{
    /// Create a new CreateOrderUseCase.
    pub const fn new(repo: Arc<R>, notifier: Arc<N>) -> Self {
        Self { repo, notifier }
    }

    /// Price, number and persist a new order.
    ///
    /// A number that turns out to be taken, either on the lookup or when the
    /// repository refuses the insert, is redrawn.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for a malformed command, `Persistence` if
    /// no free order number could be found, or any repository error.
    pub async fn execute(
        &self,
        cmd: CreateOrderCommand,
        policy: &BusinessPolicy,
        now: Timestamp,
    ) -> Result<Order, OrderError> {
        cmd.validate()?;

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = OrderNumber::generate(now);
            if self.repo.exists_order_number(&order_number).await? {
                tracing::warn!(%order_number, attempt, "Order number collision");
                continue;
            }

            let mut order = Order::create(cmd.clone(), order_number, policy, now)?;
            order.verify_invariants()?;
            let version = match self.repo.save(&order).await {
                Ok(version) => version,
                Err(OrderError::DuplicateOrderNumber { order_number }) => {
                    tracing::warn!(%order_number, attempt, "Order number taken on insert");
                    continue;
                }
                Err(e) => return Err(e),
            };
            order.set_version(version);

            tracing::info!(
                order_id = %order.id(),
                order_number = %order.order_number(),
                total = order.totals().total_amount.minor_units(),
                "Order created"
            );

            dispatch_notifications(&self.notifier, order.drain_events());
            return Ok(order);
        }

        Err(OrderError::Persistence {
            message: format!(
                "no unused order number after {MAX_ORDER_NUMBER_ATTEMPTS} attempts"
            ),
        })
    }
}
