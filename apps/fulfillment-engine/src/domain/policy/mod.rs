//! Business Policy
//!
//! The numeric constraints that parameterize every pricing and lifecycle
//! decision. A policy is an immutable snapshot passed explicitly into each
//! call; nothing reads a global policy.

mod business_policy;

pub use business_policy::BusinessPolicy;
