//! Structured shipping address.

use serde::{Deserialize, Serialize};

use crate::domain::shared::DomainError;

/// Destination for a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Person receiving the parcel.
    pub recipient: String,
    /// Street line.
    pub line1: String,
    /// Apartment, suite, etc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// City or locality.
    pub city: String,
    /// State, province or region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

impl ShippingAddress {
    /// Validate that every required line is filled in.
    ///
    /// # Errors
    ///
    /// Returns error naming the first blank required field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("shipping_address.recipient", &self.recipient),
            ("shipping_address.line1", &self.line1),
            ("shipping_address.city", &self.city),
            ("shipping_address.postal_code", &self.postal_code),
            ("shipping_address.country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::invalid_value(field, "must not be blank"));
            }
        }
        Ok(())
    }
}
