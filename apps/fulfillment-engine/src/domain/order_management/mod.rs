//! Order Management Bounded Context
//!
//! Manages the fulfillment lifecycle of an order from checkout to delivery,
//! cancellation or refund.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: The root entity; every mutation preserves its invariants
//! - **State Machine**: The transition table and guards, evaluated into a plan
//! - **Domain Events**: One per accepted transition, forwarded to notifications

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{CreateOrderCommand, Order, ReconstitutedOrderParams};
pub use errors::OrderError;
pub use events::{
    OrderCancelled, OrderCreated, OrderDelivered, OrderEvent, OrderEventKind, OrderPaid,
    OrderProcessingStarted, OrderRefunded, OrderShipped,
};
pub use repository::OrderRepository;
pub use services::{OrderStateMachine, PlannedAction, TransitionContext, TransitionPlan};
pub use value_objects::{
    CancelReason, CustomerSnapshot, FulfillmentEvent, FulfillmentEventKind, LineItem,
    OrderStatus, OrderTotals, PaymentConfirmation, PaymentStatus, PricingSnapshot,
    RefundReceipt, RefundRecord, RefundRequest, Settlement, ShippingAddress, ShippingMethod,
};
