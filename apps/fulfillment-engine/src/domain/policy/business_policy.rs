//! Business policy snapshot.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::order_management::ShippingMethod;
use crate::domain::shared::{DomainError, Money};

/// Numeric constraints in effect for a pricing or lifecycle decision.
///
/// Monetary fields are minor units. `version` is recorded on each order's
/// pricing snapshot so later policy changes never reprice existing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessPolicy {
    /// Policy revision, recorded with each order's pricing.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Smallest total an order may have when it is paid.
    #[serde(default = "default_min_order_amount")]
    pub min_order_amount: Money,

    /// Largest total an order may have when it is paid.
    #[serde(default = "default_max_order_amount")]
    pub max_order_amount: Money,

    /// Shipping cost for the standard method.
    #[serde(default = "default_shipping_cost")]
    pub default_shipping_cost: Money,

    /// Shipping cost for the express method.
    #[serde(default = "default_express_shipping_cost")]
    pub express_shipping_cost: Money,

    /// Tax rate applied to the subtotal, in `[0, 1]`.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,

    /// Hours after creation before an unpaid order is cancelled.
    #[serde(default = "default_auto_cancel_hours")]
    pub auto_cancel_hours: u32,

    /// Days after payment (or delivery) during which refunds are accepted.
    #[serde(default = "default_max_refund_days")]
    pub max_refund_days: u32,

    /// Seconds between fulfillment scheduler ticks.
    #[serde(default = "default_scheduler_interval_secs")]
    pub scheduler_interval_secs: u64,
}

const fn default_version() -> u32 {
    1
}

const fn default_min_order_amount() -> Money {
    Money::from_minor(500)
}

const fn default_max_order_amount() -> Money {
    Money::from_minor(1_000_000)
}

const fn default_shipping_cost() -> Money {
    Money::from_minor(500)
}

const fn default_express_shipping_cost() -> Money {
    Money::from_minor(1500)
}

fn default_tax_rate() -> Decimal {
    dec!(0.08)
}

const fn default_auto_cancel_hours() -> u32 {
    24
}

const fn default_max_refund_days() -> u32 {
    30
}

const fn default_scheduler_interval_secs() -> u64 {
    300
}

impl Default for BusinessPolicy {
    fn default() -> Self {
        Self {
            version: default_version(),
            min_order_amount: default_min_order_amount(),
            max_order_amount: default_max_order_amount(),
            default_shipping_cost: default_shipping_cost(),
            express_shipping_cost: default_express_shipping_cost(),
            tax_rate: default_tax_rate(),
            auto_cancel_hours: default_auto_cancel_hours(),
            max_refund_days: default_max_refund_days(),
            scheduler_interval_secs: default_scheduler_interval_secs(),
        }
    }
}

impl BusinessPolicy {
    /// Shipping cost charged for a given method. Pickup is free.
    #[must_use]
    pub const fn shipping_cost_for(&self, method: ShippingMethod) -> Money {
        match method {
            ShippingMethod::Standard => self.default_shipping_cost,
            ShippingMethod::Express => self.express_shipping_cost,
            ShippingMethod::Pickup => Money::ZERO,
        }
    }

    /// Returns true if `total` lies within `[min_order_amount, max_order_amount]`.
    #[must_use]
    pub fn is_within_order_bounds(&self, total: Money) -> bool {
        self.min_order_amount <= total && total <= self.max_order_amount
    }

    /// Age after which an unpaid order is auto-cancelled.
    #[must_use]
    pub fn auto_cancel_after(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.auto_cancel_hours))
    }

    /// Length of the refund window.
    #[must_use]
    pub fn refund_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.max_refund_days))
    }

    /// Scheduler tick interval.
    #[must_use]
    pub const fn scheduler_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.scheduler_interval_secs)
    }

    /// Validate internal consistency.
    ///
    /// # Errors
    ///
    /// Returns error for negative amounts, `min > max`, a tax rate outside
    /// `[0, 1]`, or a zero scheduler interval.
    pub fn validate(&self) -> Result<(), DomainError> {
        let amounts = [
            ("min_order_amount", self.min_order_amount),
            ("max_order_amount", self.max_order_amount),
            ("default_shipping_cost", self.default_shipping_cost),
            ("express_shipping_cost", self.express_shipping_cost),
        ];
        for (field, amount) in amounts {
            if amount.is_negative() {
                return Err(DomainError::invalid_value(field, "must not be negative"));
            }
        }

        if self.min_order_amount > self.max_order_amount {
            return Err(DomainError::invalid_value(
                "min_order_amount",
                format!(
                    "{} exceeds max_order_amount {}",
                    self.min_order_amount, self.max_order_amount
                ),
            ));
        }

        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(DomainError::invalid_value(
                "tax_rate",
                format!("{} is outside [0, 1]", self.tax_rate),
            ));
        }

        if self.scheduler_interval_secs == 0 {
            return Err(DomainError::invalid_value(
                "scheduler_interval_secs",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}
