//! Derived financial figures of an order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LineItem, ShippingMethod};
use crate::domain::policy::BusinessPolicy;
use crate::domain::shared::{DomainError, Money};

/// Subtotal, shipping, tax and total, all in minor units.
///
/// `total_amount == subtotal + shipping_cost + tax_amount` holds for every
/// value built by [`OrderTotals::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of exact line totals.
    pub subtotal: Money,
    /// Shipping charge for the chosen method.
    pub shipping_cost: Money,
    /// Tax on the subtotal, rounded half-to-even once.
    pub tax_amount: Money,
    /// Grand total.
    pub total_amount: Money,
}

/// Policy values that priced an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSnapshot {
    /// Version of the policy used.
    pub policy_version: u32,
    /// Tax rate applied.
    pub tax_rate: Decimal,
    /// Shipping cost charged.
    pub shipping_cost: Money,
}

impl OrderTotals {
    /// Price a set of line items under a policy.
    ///
    /// Tax applies to the subtotal only; shipping is untaxed.
    ///
    /// # Errors
    ///
    /// Returns error on arithmetic overflow.
    pub fn compute(
        items: &[LineItem],
        method: ShippingMethod,
        policy: &BusinessPolicy,
    ) -> Result<(Self, PricingSnapshot), DomainError> {
        let line_totals = items
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        let subtotal = Money::checked_sum(line_totals)?;
        let shipping_cost = policy.shipping_cost_for(method);
        let tax_amount = subtotal.apply_rate(policy.tax_rate)?;
        let total_amount = subtotal.checked_add(shipping_cost)?.checked_add(tax_amount)?;

        let totals = Self {
            subtotal,
            shipping_cost,
            tax_amount,
            total_amount,
        };
        let snapshot = PricingSnapshot {
            policy_version: policy.version,
            tax_rate: policy.tax_rate,
            shipping_cost,
        };
        Ok((totals, snapshot))
    }

    /// Returns true if the total equals the sum of its parts.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.subtotal
            .checked_add(self.shipping_cost)
            .and_then(|m| m.checked_add(self.tax_amount))
            .is_ok_and(|sum| sum == self.total_amount)
    }
}
