//! In-memory order repository.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::order_management::{Order, OrderError, OrderRepository, OrderStatus};
use crate::domain::shared::{OrderId, OrderNumber};

/// In-memory implementation of `OrderRepository`.
///
/// Versions start at 1 on first save and increase by one per write. Pending
/// domain events are never stored.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored orders.
    pub fn len(&self) -> Result<usize, OrderError> {
        Ok(self.read()?.len())
    }

    /// Check if the repository is empty.
    pub fn is_empty(&self) -> Result<bool, OrderError> {
        Ok(self.read()?.is_empty())
    }

    /// Synchronous lookup, for callers outside an async context.
    pub fn get(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<OrderId, Order>>, OrderError> {
        self.orders.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<OrderId, Order>>, OrderError> {
        self.orders.write().map_err(poisoned)
    }

    fn collect_sorted<F>(&self, keep: F) -> Result<Vec<Order>, OrderError>
    where
        F: Fn(&Order) -> bool,
    {
        let mut matches: Vec<Order> = self.read()?.values().filter(|o| keep(o)).cloned().collect();
        matches.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.order_number().as_str().cmp(b.order_number().as_str()))
        });
        Ok(matches)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> OrderError {
    OrderError::Persistence {
        message: "order store lock poisoned".to_string(),
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<u64, OrderError> {
        let mut orders = self.write()?;
        let stored_version = orders.get(order.id()).map_or(0, Order::version);
        if stored_version != order.version() {
            return Err(OrderError::ConcurrentWriteConflict {
                order_id: order.id().to_string(),
                expected: order.version(),
                actual: stored_version,
            });
        }

        if stored_version == 0
            && orders
                .values()
                .any(|o| o.order_number().as_str() == order.order_number().as_str())
        {
            return Err(OrderError::DuplicateOrderNumber {
                order_number: order.order_number().to_string(),
            });
        }

        let next_version = stored_version + 1;
        let mut stored = order.clone();
        stored.drain_events();
        stored.set_version(next_version);
        orders.insert(order.id().clone(), stored);

        tracing::debug!(order_id = %order.id(), version = next_version, "Order saved");
        Ok(next_version)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        self.get(id)
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError> {
        self.collect_sorted(|o| o.status() == status)
    }

    async fn snapshot(&self) -> Result<Vec<Order>, OrderError> {
        self.collect_sorted(|_| true)
    }

    async fn exists_order_number(&self, number: &OrderNumber) -> Result<bool, OrderError> {
        Ok(self
            .read()?
            .values()
            .any(|o| o.order_number().as_str() == number.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_management::{CancelReason, FulfillmentEvent, OrderStateMachine};
    use crate::domain::order_management::{Settlement, TransitionContext};
    use crate::domain::policy::BusinessPolicy;
    use crate::test_support::{pending_order, t0};

    fn cancelled(number: &str) -> Order {
        let mut order = pending_order(number, t0());
        let policy = BusinessPolicy::default();
        let ctx = TransitionContext::new(&policy, t0().plus_hours(1));
        let plan = OrderStateMachine::plan(
            &order,
            &FulfillmentEvent::cancel(CancelReason::customer_requested()),
            &ctx,
        )
        .unwrap();
        order.apply_transition(&plan, Settlement::none()).unwrap();
        order
    }

    #[tokio::test]
    async fn save_assigns_increasing_versions() {
        let repo = InMemoryOrderRepository::new();
        let mut order = pending_order("HM-20260301-AAAAAA", t0());

        assert_eq!(repo.save(&order).await.unwrap(), 1);
        order.set_version(1);
        assert_eq!(repo.save(&order).await.unwrap(), 2);

        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.version(), 2);
        assert!(stored.pending_events().is_empty());
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let repo = InMemoryOrderRepository::new();
        let order = pending_order("HM-20260301-AAAAAA", t0());
        repo.save(&order).await.unwrap();

        let result = repo.save(&order).await;

        assert!(matches!(
            result,
            Err(OrderError::ConcurrentWriteConflict {
                expected: 0,
                actual: 1,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn order_number_is_unique_across_orders() {
        let repo = InMemoryOrderRepository::new();
        let mut first = pending_order("HM-20260301-AAAAAA", t0());
        repo.save(&first).await.unwrap();

        let twin = pending_order("HM-20260301-AAAAAA", t0());
        let result = repo.save(&twin).await;
        assert!(matches!(
            result,
            Err(OrderError::DuplicateOrderNumber { ref order_number })
                if order_number == "HM-20260301-AAAAAA"
        ));
        assert_eq!(repo.len().unwrap(), 1);

        first.set_version(1);
        assert_eq!(repo.save(&first).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn find_by_id_not_found() {
        let repo = InMemoryOrderRepository::new();
        let found = repo.find_by_id(&OrderId::new("missing")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn status_queries() {
        let repo = InMemoryOrderRepository::new();
        repo.save(&pending_order("HM-20260301-AAAAAA", t0()))
            .await
            .unwrap();
        repo.save(&cancelled("HM-20260301-BBBBBB")).await.unwrap();

        assert_eq!(
            repo.find_by_status(OrderStatus::Cancelled)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(repo.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn snapshot_is_oldest_first() {
        let repo = InMemoryOrderRepository::new();
        repo.save(&pending_order("HM-20260302-NEWER1", t0().plus_days(1)))
            .await
            .unwrap();
        repo.save(&pending_order("HM-20260301-OLDER1", t0()))
            .await
            .unwrap();

        let numbers: Vec<String> = repo
            .snapshot()
            .await
            .unwrap()
            .iter()
            .map(|o| o.order_number().to_string())
            .collect();

        assert_eq!(numbers, vec!["HM-20260301-OLDER1", "HM-20260302-NEWER1"]);
    }

    #[tokio::test]
    async fn order_number_lookup() {
        let repo = InMemoryOrderRepository::new();
        repo.save(&pending_order("HM-20260301-AAAAAA", t0()))
            .await
            .unwrap();

        assert!(repo
            .exists_order_number(&OrderNumber::new("HM-20260301-AAAAAA"))
            .await
            .unwrap());
        assert!(!repo
            .exists_order_number(&OrderNumber::new("HM-20260301-ZZZZZZ"))
            .await
            .unwrap());
    }
}
