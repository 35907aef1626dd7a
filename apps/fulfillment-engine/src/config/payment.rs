//! Payment gateway and transition retry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Payment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// How long a transition waits for a refund before reporting it pending.
    #[serde(default = "default_refund_timeout_ms")]
    pub refund_timeout_ms: u64,
    /// Reload-and-replan rounds after a version conflict.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
    /// Fraction of simulated gateway calls that fail (0.0..=1.0).
    #[serde(default)]
    pub simulated_failure_rate: f64,
    /// Artificial latency of the simulated gateway.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            refund_timeout_ms: default_refund_timeout_ms(),
            max_conflict_retries: default_max_conflict_retries(),
            simulated_failure_rate: 0.0,
            simulated_latency_ms: 0,
        }
    }
}

impl PaymentConfig {
    /// Refund timeout as a duration.
    #[must_use]
    pub const fn refund_timeout(&self) -> Duration {
        Duration::from_millis(self.refund_timeout_ms)
    }

    /// Simulated latency as a duration.
    #[must_use]
    pub const fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

const fn default_refund_timeout_ms() -> u64 {
    5_000
}

const fn default_max_conflict_retries() -> u32 {
    3
}
