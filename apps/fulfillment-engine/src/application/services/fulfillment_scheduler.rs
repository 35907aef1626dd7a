//! Fulfillment scheduler.
//!
//! Periodically cancels pending orders that were never paid. Cancellations
//! go through [`TransitionOrderUseCase`], so they take the same per-order
//! lock as requests and cannot interleave with them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::application::ports::{NotificationPort, PaymentPort};
use crate::application::use_cases::{TransitionCommand, TransitionOrderUseCase};
use crate::domain::order_management::{
    CancelReason, FulfillmentEvent, OrderError, OrderRepository, OrderStatus,
};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::Timestamp;

/// Outcome of one scheduler pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Pending orders looked at.
    pub examined: usize,
    /// Orders auto-cancelled on this pass.
    pub cancelled: usize,
    /// Stale orders another writer moved first.
    pub skipped: usize,
    /// Stale orders whose cancellation errored.
    pub failed: usize,
}

/// Background auto-cancel loop.
pub struct FulfillmentScheduler<P, N, R>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    transitions: Arc<TransitionOrderUseCase<P, N, R>>,
    repo: Arc<R>,
    policy: BusinessPolicy,
    refund_timeout: Duration,
}

impl<P, N, R> FulfillmentScheduler<P, N, R>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    /// Create a new scheduler running under `policy`.
    pub const fn new(
        transitions: Arc<TransitionOrderUseCase<P, N, R>>,
        repo: Arc<R>,
        policy: BusinessPolicy,
        refund_timeout: Duration,
    ) -> Self {
        Self {
            transitions,
            repo,
            policy,
            refund_timeout,
        }
    }

    /// Run the scheduler loop until `shutdown_rx` fires.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        let period = self.policy.scheduler_interval();
        info!(
            interval_secs = period.as_secs(),
            auto_cancel_hours = self.policy.auto_cancel_hours,
            "Starting fulfillment scheduler"
        );

        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.tick(Timestamp::now(), &self.policy).await {
                        Ok(report) if report.cancelled + report.failed > 0 => {
                            info!(
                                examined = report.examined,
                                cancelled = report.cancelled,
                                skipped = report.skipped,
                                failed = report.failed,
                                "Scheduler pass complete"
                            );
                        }
                        Ok(report) => debug!(examined = report.examined, "Nothing to auto-cancel"),
                        Err(e) => error!(error = %e, "Scheduler pass failed"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Fulfillment scheduler shutting down");
                    break;
                }
            }
        }
    }

    /// One pass: cancel every pending order older than the auto-cancel
    /// window. Safe to repeat; already-cancelled orders are no longer
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns error only if the pending orders cannot be listed.
    pub async fn tick(
        &self,
        now: Timestamp,
        policy: &BusinessPolicy,
    ) -> Result<TickReport, OrderError> {
        let pending = self.repo.find_by_status(OrderStatus::Pending).await?;
        let cutoff = policy.auto_cancel_after();
        let mut report = TickReport {
            examined: pending.len(),
            ..TickReport::default()
        };

        for order in pending
            .iter()
            .filter(|o| now.duration_since(o.created_at()) > cutoff)
        {
            let cmd = TransitionCommand {
                order_id: order.id().clone(),
                event: FulfillmentEvent::cancel(CancelReason::auto_cancel_timeout()),
                policy: policy.clone(),
                now,
                refund_timeout: self.refund_timeout,
                // Only the pending order we looked at may be cancelled; a
                // payment landing in between must win.
                expected_version: Some(order.version()),
                expected_status: Some(OrderStatus::Pending),
            };
            match self.transitions.execute(cmd).await {
                Ok(_) => {
                    report.cancelled += 1;
                    info!(
                        order_id = %order.id(),
                        order_number = %order.order_number(),
                        "Auto-cancelled unpaid order"
                    );
                }
                Err(OrderError::InvalidTransition { from, .. }) => {
                    report.skipped += 1;
                    debug!(order_id = %order.id(), status = %from, "Order moved before auto-cancel");
                }
                Err(OrderError::ConcurrentWriteConflict { actual, .. }) => {
                    report.skipped += 1;
                    debug!(order_id = %order.id(), version = actual, "Order changed before auto-cancel");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(order_id = %order.id(), error = %e, "Auto-cancel failed");
                }
            }
        }

        Ok(report)
    }
}
