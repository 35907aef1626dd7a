//! Notification Port (Driven Port)
//!
//! Interface for telling customers and sellers about order events.

use async_trait::async_trait;

use crate::domain::order_management::OrderEventKind;
use crate::domain::shared::OrderId;

/// Notification delivery error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    /// Delivery failed.
    #[error("Notification delivery failed: {message}")]
    DeliveryFailed { message: String },
}

/// Port for order notifications. Fire-and-forget from the caller's view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Notify interested parties that `event` happened to `order_id`.
    async fn notify(
        &self,
        order_id: &OrderId,
        event: OrderEventKind,
    ) -> Result<(), NotificationError>;
}

/// No-op notifier for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl NotificationPort for NoOpNotifier {
    async fn notify(
        &self,
        _order_id: &OrderId,
        _event: OrderEventKind,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}
