//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driver Ports** (Primary/Inbound): How the world uses our application
//! - **Driven Ports** (Secondary/Outbound): How our application uses external systems
//!
//! The order repository port lives in the domain layer
//! ([`crate::domain::order_management::OrderRepository`]).

mod notification_port;
mod payment_port;

pub use notification_port::{NoOpNotifier, NotificationError, NotificationPort};
pub use payment_port::{PaymentError, PaymentPort};

#[cfg(test)]
pub use notification_port::MockNotificationPort;
#[cfg(test)]
pub use payment_port::MockPaymentPort;
