//! Errors raised by shared value objects.

use std::fmt;

/// Errors that can occur while constructing or combining shared value objects.
///
/// These errors are independent of infrastructure concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Fixed-point arithmetic left the representable range.
    Overflow {
        /// The operation that overflowed.
        operation: String,
    },
}

impl DomainError {
    /// Build an `InvalidValue` error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::Overflow { operation } => {
                write!(f, "Arithmetic overflow in {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
