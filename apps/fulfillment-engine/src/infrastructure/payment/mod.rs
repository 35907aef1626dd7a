//! Payment Adapters

pub mod simulated;

pub use simulated::{RefundBehavior, SimulatedPaymentGateway};
