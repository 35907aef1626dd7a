//! Shared Domain Types
//!
//! Value objects and errors shared across bounded contexts.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::{
    Currency, Money, OrderId, OrderNumber, ProductId, Quantity, RefundId, Timestamp,
};
