//! Notification adapters that stay in-process.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::application::ports::{NotificationError, NotificationPort};
use crate::domain::order_management::OrderEventKind;
use crate::domain::shared::OrderId;

/// Writes each order event to the log instead of emailing anyone.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Create a new notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationPort for TracingNotifier {
    async fn notify(
        &self,
        order_id: &OrderId,
        event: OrderEventKind,
    ) -> Result<(), NotificationError> {
        tracing::info!(order_id = %order_id, event = %event, "Order notification");
        Ok(())
    }
}

/// Keeps every notification it receives, for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<(OrderId, OrderEventKind)>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, in arrival order.
    #[must_use]
    pub fn received(&self) -> Vec<(OrderId, OrderEventKind)> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event kinds received for one order.
    #[must_use]
    pub fn kinds_for(&self, order_id: &OrderId) -> Vec<OrderEventKind> {
        self.received()
            .into_iter()
            .filter(|(id, _)| id == order_id)
            .map(|(_, kind)| kind)
            .collect()
    }
}

#[async_trait]
impl NotificationPort for RecordingNotifier {
    async fn notify(
        &self,
        order_id: &OrderId,
        event: OrderEventKind,
    ) -> Result<(), NotificationError> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((order_id.clone(), event));
        Ok(())
    }
}
