//! Domain Services for Order Management
//!
//! Stateless business logic that doesn't belong to a single aggregate.

mod order_state_machine;

pub use order_state_machine::{OrderStateMachine, PlannedAction, TransitionContext, TransitionPlan};
