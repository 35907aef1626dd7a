//! Simulated payment gateway.
//!
//! Stands in for a real processor in the binary and in tests. Confirms
//! whatever amount it is asked to confirm, keeps refunds idempotent per key,
//! and can be configured to decline, fail, stall or randomly drop calls.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::application::ports::{PaymentError, PaymentPort};
use crate::domain::order_management::{PaymentConfirmation, RefundReceipt, RefundRequest};
use crate::domain::shared::{Money, OrderId, RefundId, Timestamp};

/// How the gateway answers refund requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefundBehavior {
    /// Process every refund.
    #[default]
    Succeed,
    /// Decline every refund.
    Decline,
    /// Never answer; the caller's timeout decides.
    Hang,
}

#[derive(Debug, Default)]
struct Ledger {
    receipts: HashMap<String, RefundReceipt>,
    log: Vec<RefundRequest>,
}

/// In-process payment gateway with tunable failure modes.
#[derive(Debug, Default)]
pub struct SimulatedPaymentGateway {
    failure_rate: f64,
    latency: Duration,
    decline_payments: bool,
    refund_behavior: RefundBehavior,
    ledger: Mutex<Ledger>,
}

impl SimulatedPaymentGateway {
    /// Create a gateway that accepts everything immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail this fraction of calls (0.0..=1.0) with `Unavailable`.
    #[must_use]
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Decline every payment confirmation.
    #[must_use]
    pub fn declining_payments(mut self) -> Self {
        self.decline_payments = true;
        self
    }

    /// Set the refund behavior.
    #[must_use]
    pub fn with_refund_behavior(mut self, behavior: RefundBehavior) -> Self {
        self.refund_behavior = behavior;
        self
    }

    /// Every distinct refund the gateway processed, in order.
    #[must_use]
    pub fn refund_log(&self) -> Vec<RefundRequest> {
        self.ledger().log.clone()
    }

    /// Total amount refunded for one order.
    #[must_use]
    pub fn refunded_for(&self, order_id: &OrderId) -> Money {
        self.ledger()
            .log
            .iter()
            .filter(|r| &r.order_id == order_id)
            .map(|r| r.amount)
            .sum()
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_network(&self) -> Result<(), PaymentError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failure_rate > 0.0 && rand::rng().random_bool(self.failure_rate) {
            return Err(PaymentError::Unavailable {
                message: "simulated gateway outage".to_string(),
            });
        }
        Ok(())
    }
}

fn gateway_reference(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

#[async_trait]
impl PaymentPort for SimulatedPaymentGateway {
    async fn confirm_payment(
        &self,
        order_id: &OrderId,
        amount: Money,
    ) -> Result<PaymentConfirmation, PaymentError> {
        self.simulate_network().await?;
        if self.decline_payments {
            return Err(PaymentError::Declined {
                message: format!("card declined for order {order_id}"),
            });
        }
        if amount.is_negative() {
            return Err(PaymentError::InvalidRequest {
                message: format!("cannot capture {amount}"),
            });
        }

        let confirmation = PaymentConfirmation {
            transaction_id: gateway_reference("txn"),
            amount,
            confirmed_at: Timestamp::now(),
        };
        tracing::info!(
            order_id = %order_id,
            transaction_id = %confirmation.transaction_id,
            amount = amount.minor_units(),
            "Payment confirmed"
        );
        Ok(confirmation)
    }

    async fn refund(&self, request: RefundRequest) -> Result<RefundReceipt, PaymentError> {
        self.simulate_network().await?;
        match self.refund_behavior {
            RefundBehavior::Succeed => {}
            RefundBehavior::Decline => {
                return Err(PaymentError::Declined {
                    message: format!("refund declined for order {}", request.order_id),
                });
            }
            RefundBehavior::Hang => std::future::pending::<()>().await,
        }
        if !request.amount.is_positive() {
            return Err(PaymentError::InvalidRequest {
                message: format!("refund amount must be positive, got {}", request.amount),
            });
        }

        let mut ledger = self.ledger();
        if let Some(existing) = ledger.receipts.get(&request.idempotency_key) {
            tracing::debug!(key = %request.idempotency_key, "Replaying refund receipt");
            return Ok(existing.clone());
        }

        let receipt = RefundReceipt {
            refund_id: RefundId::new(gateway_reference("re")),
            amount: request.amount,
            processed_at: Timestamp::now(),
        };
        ledger
            .receipts
            .insert(request.idempotency_key.clone(), receipt.clone());
        tracing::info!(
            order_id = %request.order_id,
            refund_id = %receipt.refund_id,
            amount = request.amount.minor_units(),
            "Refund processed"
        );
        ledger.log.push(request);
        Ok(receipt)
    }
}
