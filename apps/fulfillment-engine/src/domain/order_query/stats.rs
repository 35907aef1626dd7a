//! Aggregate statistics over a set of orders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::order_management::{Order, OrderStatus};
use crate::domain::shared::Money;

/// Dashboard figures for a filtered set of orders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderStats {
    /// Number of orders.
    pub count: usize,
    /// Sum of order totals.
    pub total_revenue: Money,
    /// `total_revenue / count`, rounded half-to-even; zero when empty.
    pub average_order_value: Money,
    /// Number of orders per status.
    pub status_counts: BTreeMap<OrderStatus, usize>,
}

impl OrderStats {
    /// Compute statistics for a set of orders.
    #[must_use]
    pub fn from_orders<'a, I>(orders: I) -> Self
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut stats = Self::default();
        for order in orders {
            stats.count += 1;
            stats.total_revenue = stats
                .total_revenue
                .saturating_add(order.totals().total_amount);
            *stats.status_counts.entry(order.status()).or_insert(0) += 1;
        }
        stats.average_order_value = stats.total_revenue.average_over(stats.count);
        stats
    }

    /// Count for one status, zero if absent.
    #[must_use]
    pub fn count_for(&self, status: OrderStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}
