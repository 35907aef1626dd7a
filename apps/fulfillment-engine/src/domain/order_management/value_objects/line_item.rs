//! A product line on an order.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, Money, ProductId, Quantity};

/// One product line: a catalog snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product id.
    pub product_id: ProductId,
    /// Product name at the time of purchase.
    pub name: String,
    /// Price per unit, minor units.
    pub unit_price: Money,
    /// Units ordered.
    pub quantity: Quantity,
}

impl LineItem {
    /// Create a new line item.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: Quantity,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Exact `unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns error on overflow.
    pub fn line_total(&self) -> Result<Money, DomainError> {
        self.unit_price.times(self.quantity)
    }

    /// Validate the line.
    ///
    /// # Errors
    ///
    /// Returns error if the name is blank or the price is negative.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_value("items.name", "must not be blank"));
        }
        if self.unit_price.is_negative() {
            return Err(DomainError::invalid_value(
                "items.unit_price",
                format!("{} is negative", self.unit_price),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_exact() {
        let item = LineItem::new(
            "lavender-oil",
            "Lavender Oil 30ml",
            Money::from_minor(2499),
            Quantity::new(2).unwrap(),
        );
        assert_eq!(item.line_total().unwrap(), Money::from_minor(4998));
    }

    #[test]
    fn line_validate_rejects_negative_price() {
        let item = LineItem::new("x", "Nettle", Money::from_minor(-1), Quantity::ONE);
        assert!(item.validate().is_err());
    }

    #[test]
    fn line_validate_allows_free_items() {
        let item = LineItem::new("sample", "Tea sample", Money::ZERO, Quantity::ONE);
        assert!(item.validate().is_ok());
    }
}
