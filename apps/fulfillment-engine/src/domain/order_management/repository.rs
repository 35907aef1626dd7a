//! Order Repository Trait
//!
//! Defines the persistence abstraction for orders.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;

use super::aggregate::Order;
use super::errors::OrderError;
use super::value_objects::OrderStatus;
use crate::domain::shared::{OrderId, OrderNumber};

/// Repository trait for Order persistence.
///
/// `save` is an optimistic compare-and-set on [`Order::version`]: an order
/// loaded at version `n` can only be written while the store still holds
/// version `n` (or nothing, for `n == 0`).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert or update an order and return the new stored version.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentWriteConflict` if the stored version differs from
    /// `order.version()`, or `Persistence` if the store fails.
    async fn save(&self, order: &Order) -> Result<u64, OrderError>;

    /// Find an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError>;

    /// Find all orders with a given status.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError>;

    /// Point-in-time copy of every order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn snapshot(&self) -> Result<Vec<Order>, OrderError>;

    /// Check whether an order number is already taken.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn exists_order_number(&self, number: &OrderNumber) -> Result<bool, OrderError>;
}
