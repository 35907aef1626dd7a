// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Fulfillment Engine - Rust Core Library
//!
//! Order state machine and fulfillment engine for the herbal marketplace.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `order_management`: Order aggregate, status lifecycle, pricing, refunds
//!   - `order_query`: Filters and dashboard statistics over order snapshots
//!   - `policy`: Business policy table (bounds, tax, windows)
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`PaymentPort`, `NotificationPort`)
//!   - `use_cases`: `CreateOrder`, `TransitionOrder`, `UpdateOrder`, `QueryOrders`
//!   - `services`: Auto-cancel scheduler, per-order locks, notification dispatch
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: In-memory order repository
//!   - `payment`: Simulated payment gateway
//!   - `notification`: Tracing and recording notifiers
//!   - `http`: REST API

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// API error codes and HTTP mapping.
pub mod error;

/// Tracing subscriber setup.
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::order_management::{
    FulfillmentEvent, Order, OrderError, OrderEvent, OrderRepository, OrderStatus,
    PaymentStatus,
};
pub use domain::order_query::{FilterSpec, OrderStats, QueryResult};
pub use domain::policy::BusinessPolicy;
pub use domain::shared::{Money, OrderId, Quantity, Timestamp};

// Application re-exports
pub use application::dto::{CreateOrderDto, OrderDto, TransitionRequestDto};
pub use application::ports::{NotificationPort, PaymentError, PaymentPort};
pub use application::services::{FulfillmentScheduler, OrderLocks, TickReport};
pub use application::use_cases::{
    CreateOrderUseCase, QueryOrdersUseCase, TransitionCommand, TransitionOrderUseCase,
    UpdateOrderUseCase,
};

// Infrastructure re-exports
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::notification::{RecordingNotifier, TracingNotifier};
pub use infrastructure::payment::{RefundBehavior, SimulatedPaymentGateway};
pub use infrastructure::persistence::InMemoryOrderRepository;

// Error re-exports
pub use error::{ErrorCode, FulfillmentError};
