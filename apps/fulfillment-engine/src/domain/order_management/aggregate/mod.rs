//! Aggregates for Order Management
//!
//! The Order aggregate is the consistency boundary for the fulfillment lifecycle.

mod order;

pub use order::{CreateOrderCommand, Order, ReconstitutedOrderParams};
