//! Transition Order Use Case
//!
//! The only path by which an order changes status. Each call holds the
//! order's lock for the whole load, plan, settle and save sequence.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{NotificationPort, PaymentPort};
use crate::application::services::{OrderLocks, dispatch_notifications};
use crate::domain::order_management::{
    FulfillmentEvent, Order, OrderError, OrderRepository, OrderStateMachine, OrderStatus,
    PlannedAction, RefundReceipt, RefundRequest, Settlement, TransitionContext, TransitionPlan,
};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{OrderId, Timestamp};

/// Default number of reload-and-replan rounds after a version conflict.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// A requested status change.
#[derive(Debug, Clone)]
pub struct TransitionCommand {
    /// Order to transition.
    pub order_id: OrderId,
    /// Requested event.
    pub event: FulfillmentEvent,
    /// Policy in effect for this request.
    pub policy: BusinessPolicy,
    /// Request time.
    pub now: Timestamp,
    /// Upper bound on waiting for the gateway to answer a refund.
    pub refund_timeout: Duration,
    /// Version the caller observed. When set, a request against a newer
    /// version is rejected instead of replanned.
    pub expected_version: Option<u64>,
    /// Status the caller observed. When unset, the status read on arrival
    /// is used.
    pub expected_status: Option<OrderStatus>,
}

/// Outcome of one plan-settle-save round.
enum Attempt {
    Applied(Box<Order>),
    /// A lost earlier refund was booked; the order must be replanned.
    RecoveredRefund { version: u64 },
}

/// Use case for applying fulfillment events to orders.
pub struct TransitionOrderUseCase<P, N, R>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    payment: Arc<P>,
    notifier: Arc<N>,
    repo: Arc<R>,
    locks: Arc<OrderLocks>,
    max_conflict_retries: u32,
}

impl<P, N, R> TransitionOrderUseCase<P, N, R>
where
    P: PaymentPort,
    N: NotificationPort + 'static,
    R: OrderRepository,
{
    /// Create a new TransitionOrderUseCase.
    pub fn new(payment: Arc<P>, notifier: Arc<N>, repo: Arc<R>, locks: Arc<OrderLocks>) -> Self {
        Self {
            payment,
            notifier,
            repo,
            locks,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    /// Override the conflict retry bound.
    #[must_use]
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    /// Apply `cmd.event` to the order.
    ///
    /// The request is bound to the status the order had when it was issued
    /// (`cmd.expected_status`, or the status read before waiting on the
    /// order's lock). If another writer moved the order first, the request
    /// fails with `InvalidTransition` instead of being replayed against the
    /// new status.
    ///
    /// On success the returned order carries its new stored version and its
    /// events have been handed to the notifier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, any guard error from the state machine,
    /// `PaymentNotConfirmed`, `RefundFailed`, `RefundPending`, or
    /// `ConcurrentWriteConflict` once retries are exhausted. On every error
    /// the stored order is unchanged, apart from refunds the gateway had
    /// already made which are booked as they are discovered.
    pub async fn execute(&self, cmd: TransitionCommand) -> Result<Order, OrderError> {
        let issued_against = match cmd.expected_status {
            Some(status) => status,
            None => self.load(&cmd.order_id).await?.status(),
        };
        let _guard = self.locks.acquire(&cmd.order_id).await;

        let mut expected_version = cmd.expected_version;
        let mut conflicts = 0;
        let mut recovered = 0;
        loop {
            let order = self.load(&cmd.order_id).await?;
            Self::check_expected_version(&order, expected_version)?;
            Self::check_issued_against(&order, issued_against, &cmd.event)?;
            match self.attempt(order, &cmd).await {
                Ok(Attempt::Applied(order)) => return Ok(*order),
                Ok(Attempt::RecoveredRefund { version }) => {
                    recovered += 1;
                    if recovered > self.max_conflict_retries {
                        return Err(OrderError::RefundFailed {
                            order_id: cmd.order_id.to_string(),
                            message: "gateway keeps replaying earlier refunds".to_string(),
                        });
                    }
                    expected_version = expected_version.map(|_| version);
                }
                Err(OrderError::ConcurrentWriteConflict {
                    expected, actual, ..
                }) if conflicts < self.max_conflict_retries => {
                    conflicts += 1;
                    tracing::warn!(
                        order_id = %cmd.order_id,
                        expected,
                        actual,
                        attempt = conflicts,
                        "Version conflict, replanning"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn load(&self, order_id: &OrderId) -> Result<Order, OrderError> {
        self.repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })
    }

    fn check_expected_version(order: &Order, expected: Option<u64>) -> Result<(), OrderError> {
        match expected {
            Some(expected) if expected != order.version() => {
                Err(OrderError::ConcurrentWriteConflict {
                    order_id: order.id().to_string(),
                    expected,
                    actual: order.version(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_issued_against(
        order: &Order,
        issued_against: OrderStatus,
        event: &FulfillmentEvent,
    ) -> Result<(), OrderError> {
        if order.status() == issued_against {
            return Ok(());
        }
        tracing::debug!(
            order_id = %order.id(),
            issued_against = %issued_against,
            current = %order.status(),
            "Order moved while the request waited"
        );
        Err(OrderError::InvalidTransition {
            from: order.status(),
            event: event.kind(),
        })
    }

    async fn attempt(&self, mut order: Order, cmd: &TransitionCommand) -> Result<Attempt, OrderError> {
        let ctx = TransitionContext::new(&cmd.policy, cmd.now);
        let plan = OrderStateMachine::plan(&order, &cmd.event, &ctx)?;
        let mut settlement = self.settle(&order, &plan, cmd.refund_timeout).await?;

        if let Some(due) = plan.refund_due()
            && let Some(replayed) = settlement.refund.take_if(|receipt| receipt.amount != due)
        {
            return self.recover_refund(order, replayed, cmd.now).await;
        }

        order.apply_transition(&plan, settlement)?;
        order.verify_invariants()?;
        let version = self.repo.save(&order).await?;
        order.set_version(version);

        tracing::info!(
            order_id = %order.id(),
            event = %plan.event,
            from = %plan.from,
            to = %plan.to,
            version,
            "Order transitioned"
        );

        dispatch_notifications(&self.notifier, order.drain_events());
        Ok(Attempt::Applied(Box::new(order)))
    }

    /// The gateway answered a refund key with a receipt for another amount:
    /// an earlier request under that key went through but its answer was
    /// lost. Book that receipt so the next plan uses a fresh key against
    /// the reduced refundable remainder.
    async fn recover_refund(
        &self,
        mut order: Order,
        receipt: RefundReceipt,
        now: Timestamp,
    ) -> Result<Attempt, OrderError> {
        tracing::warn!(
            order_id = %order.id(),
            refund_id = %receipt.refund_id,
            amount = receipt.amount.minor_units(),
            "Booking refund replayed by the gateway"
        );
        order.book_recovered_refund(receipt, now)?;
        order.verify_invariants()?;
        let version = self.repo.save(&order).await?;
        dispatch_notifications(&self.notifier, order.drain_events());
        Ok(Attempt::RecoveredRefund { version })
    }

    /// Call the payment gateway for whatever the plan needs.
    ///
    /// The refund sequence number is derived from the refunds already
    /// booked, so a retry after a timeout or a lost save reuses the same
    /// idempotency key.
    async fn settle(
        &self,
        order: &Order,
        plan: &TransitionPlan,
        refund_timeout: Duration,
    ) -> Result<Settlement, OrderError> {
        let mut settlement = Settlement::none();

        if let PlannedAction::ConfirmPayment { expected_amount } = &plan.action {
            let confirmation = self
                .payment
                .confirm_payment(order.id(), *expected_amount)
                .await
                .map_err(|e| OrderError::PaymentNotConfirmed {
                    order_id: order.id().to_string(),
                    message: e.to_string(),
                })?;
            settlement.payment = Some(confirmation);
        }

        if let Some(amount) = plan.refund_due() {
            let request = RefundRequest::new(order.id().clone(), amount, order.refunds().len() + 1);
            tracing::debug!(
                order_id = %order.id(),
                key = %request.idempotency_key,
                amount = amount.minor_units(),
                "Requesting refund"
            );
            let receipt = match tokio::time::timeout(refund_timeout, self.payment.refund(request))
                .await
            {
                Ok(Ok(receipt)) => receipt,
                Ok(Err(e)) => {
                    tracing::warn!(order_id = %order.id(), error = %e, "Refund failed");
                    return Err(OrderError::RefundFailed {
                        order_id: order.id().to_string(),
                        message: e.to_string(),
                    });
                }
                Err(_) => {
                    tracing::warn!(
                        order_id = %order.id(),
                        timeout_ms = refund_timeout.as_millis() as u64,
                        "Refund timed out"
                    );
                    return Err(OrderError::RefundPending {
                        order_id: order.id().to_string(),
                    });
                }
            };
            settlement.refund = Some(receipt);
        }

        Ok(settlement)
    }
}
