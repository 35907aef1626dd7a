//! Shipping method chosen at checkout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Ground shipping.
    #[default]
    Standard,
    /// Expedited shipping.
    Express,
    /// Customer collects from the seller.
    Pickup,
}

impl ShippingMethod {
    /// Estimated days from shipment to delivery.
    #[must_use]
    pub const fn delivery_offset_days(&self) -> i64 {
        match self {
            Self::Standard => 5,
            Self::Express => 2,
            Self::Pickup => 1,
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Pickup => "pickup",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "pickup" => Ok(Self::Pickup),
            other => Err(DomainError::invalid_value(
                "shipping_method",
                format!("unknown shipping method '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_offsets() {
        assert_eq!(ShippingMethod::Standard.delivery_offset_days(), 5);
        assert_eq!(ShippingMethod::Express.delivery_offset_days(), 2);
        assert_eq!(ShippingMethod::Pickup.delivery_offset_days(), 1);
    }

    #[test]
    fn parse_shipping_method() {
        assert_eq!(
            "Express".parse::<ShippingMethod>().unwrap(),
            ShippingMethod::Express
        );
        assert!("drone".parse::<ShippingMethod>().is_err());
    }
}
