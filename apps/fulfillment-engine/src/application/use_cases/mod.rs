//! Use Cases
//!
//! Application operations that orchestrate the domain and the ports.

pub mod create_order;
pub mod query_orders;
pub mod transition_order;
pub mod update_order;

pub use create_order::{CreateOrderUseCase, MAX_ORDER_NUMBER_ATTEMPTS};
pub use query_orders::QueryOrdersUseCase;
pub use transition_order::{
    DEFAULT_MAX_CONFLICT_RETRIES, TransitionCommand, TransitionOrderUseCase,
};
pub use update_order::UpdateOrderUseCase;
