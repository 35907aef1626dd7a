//! Customer snapshot copied onto the order at checkout.

use serde::{Deserialize, Serialize};

use crate::domain::shared::DomainError;

/// Customer contact details as they were when the order was placed.
///
/// This is a copy, never a live reference to an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerSnapshot {
    /// Create a new snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    /// Attach a phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Validate the snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the name is blank or the email has no `@`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_value("customer.name", "must not be blank"));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(DomainError::invalid_value(
                "customer.email",
                format!("'{email}' is not an email address"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_validate() {
        assert!(CustomerSnapshot::new("Ada Lovelace", "ada@example.com").validate().is_ok());
        assert!(CustomerSnapshot::new(" ", "ada@example.com").validate().is_err());
        assert!(CustomerSnapshot::new("Ada", "ada.example.com").validate().is_err());
        assert!(CustomerSnapshot::new("Ada", "@example.com").validate().is_err());
    }

    #[test]
    fn customer_phone_is_optional_in_json() {
        let json = serde_json::to_string(&CustomerSnapshot::new("Ada", "a@b.c")).unwrap();
        assert!(!json.contains("phone"));
        let with_phone = CustomerSnapshot::new("Ada", "a@b.c").with_phone("+1 555 0100");
        assert_eq!(with_phone.phone.as_deref(), Some("+1 555 0100"));
    }
}
