//! Infrastructure Layer
//!
//! This module contains all adapters (implementations) for the ports defined
//! in the application layer. Following hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**: Implement ports for external systems
//!   - `persistence/`: Order storage
//!   - `payment/`: Payment gateway adapters
//!   - `notification/`: Customer notification adapters
//!
//! - **Driver Adapters (Inbound)**: Expose application to external world
//!   - `http/`: REST API controllers

pub mod http;
pub mod notification;
pub mod payment;
pub mod persistence;
