//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Records of state transitions
//! - **Domain Services**: Stateless business logic
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`order_management`]: Order lifecycle, state machine and invariants
//! - [`order_query`]: Filtered views and dashboard statistics
//! - [`policy`]: Business policy snapshot shared by both

pub mod order_management;
pub mod order_query;
pub mod policy;
pub mod shared;
