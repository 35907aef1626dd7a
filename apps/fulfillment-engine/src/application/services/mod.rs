//! Application Services
//!
//! Long-running and cross-cutting services built on the use cases.

pub mod fulfillment_scheduler;
pub mod notification_dispatch;
pub mod order_locks;

pub use fulfillment_scheduler::{FulfillmentScheduler, TickReport};
pub use notification_dispatch::dispatch_notifications;
pub use order_locks::OrderLocks;
