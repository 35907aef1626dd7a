//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Timestamp;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderId, "Unique identifier for an order.");
define_id!(ProductId, "Catalog identifier for a product.");
define_id!(RefundId, "Gateway identifier for a processed refund.");

const ORDER_NUMBER_PREFIX: &str = "HM";
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;
const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Human-readable order number, e.g. `HM-20260119-4KQ7ZP`.
///
/// Generated once at creation from the UTC creation date and a random
/// suffix. Uniqueness is enforced against the repository by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Wrap an existing order number.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh order number for an order created at `created_at`.
    #[must_use]
    pub fn generate(created_at: Timestamp) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
                char::from(ORDER_NUMBER_ALPHABET[idx])
            })
            .collect();
        Self(format!(
            "{ORDER_NUMBER_PREFIX}-{}-{suffix}",
            created_at.as_datetime().format("%Y%m%d")
        ))
    }

    /// Returns true if the value has the `HM-YYYYMMDD-XXXXXX` shape.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut parts = self.0.split('-');
        let (Some(prefix), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        prefix == ORDER_NUMBER_PREFIX
            && date.len() == 8
            && date.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == ORDER_NUMBER_SUFFIX_LEN
            && suffix.bytes().all(|b| ORDER_NUMBER_ALPHABET.contains(&b))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
