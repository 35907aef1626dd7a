//! Fire-and-forget delivery of domain events to the notification port.

use std::sync::Arc;

use crate::application::ports::NotificationPort;
use crate::domain::order_management::OrderEvent;

/// Forward drained events to `notifier` on a background task.
///
/// Delivery failures are logged and never reach the caller; the transition
/// that produced the events is already committed.
pub fn dispatch_notifications<N>(notifier: &Arc<N>, events: Vec<OrderEvent>)
where
    N: NotificationPort + ?Sized + 'static,
{
    if events.is_empty() {
        return;
    }
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        for event in events {
            let order_id = event.order_id().clone();
            let kind = event.kind();
            if let Err(e) = notifier.notify(&order_id, kind).await {
                tracing::warn!(order_id = %order_id, event = %kind, error = %e, "Notification failed");
            }
        }
    });
}
