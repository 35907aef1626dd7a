//! Update Order Use Case
//!
//! Seller edits that do not change status: notes at any time, shipping
//! address and line items only while `pending`.

use std::sync::Arc;

use crate::application::services::OrderLocks;
use crate::domain::order_management::{
    LineItem, Order, OrderError, OrderRepository, ShippingAddress,
};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{OrderId, Timestamp};

/// Use case for seller edits.
pub struct UpdateOrderUseCase<R>
where
    R: OrderRepository,
{
    repo: Arc<R>,
    locks: Arc<OrderLocks>,
}

impl<R> UpdateOrderUseCase<R>
where
    R: OrderRepository,
{
    /// Create a new UpdateOrderUseCase sharing `locks` with transitions.
    pub const fn new(repo: Arc<R>, locks: Arc<OrderLocks>) -> Self {
        Self { repo, locks }
    }

    /// Replace the seller notes.
    pub async fn update_notes(
        &self,
        order_id: &OrderId,
        notes: String,
        now: Timestamp,
    ) -> Result<Order, OrderError> {
        self.edit(order_id, "notes", |order| {
            order.update_notes(notes.clone(), now);
            Ok(())
        })
        .await
    }

    /// Set the shipping address of a pending order.
    pub async fn update_shipping_address(
        &self,
        order_id: &OrderId,
        address: ShippingAddress,
        now: Timestamp,
    ) -> Result<Order, OrderError> {
        self.edit(order_id, "shipping_address", |order| {
            order.update_shipping_address(address.clone(), now)
        })
        .await
    }

    /// Replace the items of a pending order and reprice under `policy`.
    pub async fn replace_items(
        &self,
        order_id: &OrderId,
        items: Vec<LineItem>,
        policy: &BusinessPolicy,
        now: Timestamp,
    ) -> Result<Order, OrderError> {
        self.edit(order_id, "items", |order| {
            order.replace_items(items.clone(), policy, now)
        })
        .await
    }

    /// Load, mutate, verify and save under the order's lock.
    ///
    /// A version conflict from a writer outside this process is retried once
    /// against the fresh state.
    async fn edit<F>(&self, order_id: &OrderId, field: &str, mut apply: F) -> Result<Order, OrderError>
    where
        F: FnMut(&mut Order) -> Result<(), OrderError>,
    {
        let _guard = self.locks.acquire(order_id).await;

        let mut retried = false;
        loop {
            let mut order = self
                .repo
                .find_by_id(order_id)
                .await?
                .ok_or_else(|| OrderError::NotFound {
                    order_id: order_id.to_string(),
                })?;
            apply(&mut order)?;
            order.verify_invariants()?;
            match self.repo.save(&order).await {
                Ok(version) => {
                    order.set_version(version);
                    tracing::info!(order_id = %order_id, field, version, "Order edited");
                    return Ok(order);
                }
                Err(OrderError::ConcurrentWriteConflict { .. }) if !retried => retried = true,
                Err(e) => return Err(e),
            }
        }
    }
}
