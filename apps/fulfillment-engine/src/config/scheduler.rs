//! Auto-cancel scheduler configuration.
//!
//! The tick interval itself is part of the business policy
//! (`policy.scheduler_interval_secs`).

use serde::{Deserialize, Serialize};

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Run the auto-cancel loop in this process.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}
