//! Filtering and aggregation over an explicit snapshot.

use serde::{Deserialize, Serialize};

use super::{FilterSpec, OrderStats};
use crate::domain::order_management::Order;

/// Orders matching a filter, plus statistics over exactly those orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matching orders, in input order.
    pub matches: Vec<Order>,
    /// Statistics over `matches`.
    pub stats: OrderStats,
}

/// Select the orders matching `filter` and aggregate them.
///
/// The filter is stable (input order is kept) and the input is not mutated.
#[must_use]
pub fn query_orders(orders: &[Order], filter: &FilterSpec) -> QueryResult {
    let matches: Vec<Order> = orders
        .iter()
        .filter(|order| filter.matches(order))
        .cloned()
        .collect();
    let stats = OrderStats::from_orders(&matches);
    QueryResult { matches, stats }
}
