//! Order Query Bounded Context
//!
//! Read-only selection and aggregation over a point-in-time snapshot of
//! orders, as shown on seller dashboards. Nothing here mutates an order.

mod engine;
mod filter;
mod stats;

pub use engine::{QueryResult, query_orders};
pub use filter::{DateRange, FilterSpec, StatusFilter};
pub use stats::OrderStats;
