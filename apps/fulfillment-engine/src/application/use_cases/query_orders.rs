//! Query Orders Use Case

use std::sync::Arc;

use crate::domain::order_management::{Order, OrderError, OrderRepository};
use crate::domain::order_query::{FilterSpec, QueryResult, query_orders};
use crate::domain::shared::OrderId;

/// Read-only access to orders for dashboards.
pub struct QueryOrdersUseCase<R>
where
    R: OrderRepository,
{
    repo: Arc<R>,
}

impl<R> QueryOrdersUseCase<R>
where
    R: OrderRepository,
{
    /// Create a new QueryOrdersUseCase.
    pub const fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Filter a point-in-time snapshot and aggregate the matches.
    pub async fn execute(&self, filter: &FilterSpec) -> Result<QueryResult, OrderError> {
        let snapshot = self.repo.snapshot().await?;
        let result = query_orders(&snapshot, filter);
        tracing::debug!(
            scanned = snapshot.len(),
            matched = result.stats.count,
            "Orders queried"
        );
        Ok(result)
    }

    /// Fetch a single order.
    pub async fn get(&self, order_id: &OrderId) -> Result<Order, OrderError> {
        self.repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })
    }
}
