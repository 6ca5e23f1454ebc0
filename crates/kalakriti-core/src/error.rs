//! Domain error types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field-level validation messages keyed by form field name.
///
/// An empty map means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field`. A later message for the same field
    /// replaces the earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Returns the message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns `true` if `field` has an error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns `true` when no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges every entry of `other` into `self`.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Iterates `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converts the map into a `Result`: `Ok(())` when empty, otherwise a
    /// `DomainError::Validation` carrying the map.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if any field has an error.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// One or more form fields failed validation.
    #[error("validation error: {0}")]
    Validation(FieldErrors),

    /// A checkout step transition was rejected.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// An order submission is already outstanding for this checkout.
    #[error("an order submission is already in flight")]
    SubmissionInFlight,

    /// The checkout reached confirmation; no further changes are accepted.
    #[error("checkout is already complete")]
    CheckoutComplete,

    /// The action requires a signed-in user.
    #[error("sign in required")]
    Unauthenticated,

    /// An external service (address book, payment, order) failed. The message
    /// is suitable for display to the user.
    #[error("{0}")]
    External(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Builds a single-field validation error.
    #[must_use]
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message);
        Self::Validation(errors)
    }

    /// Returns the field errors if this is a validation error.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_errors_into_result_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_non_empty_field_errors_into_result_is_validation() {
        // Arrange
        let mut errors = FieldErrors::new();
        errors.insert("pincode", "Pincode must be 6 digits");

        // Act
        let result = errors.into_result();

        // Assert
        match result {
            Err(DomainError::Validation(fields)) => {
                assert_eq!(fields.get("pincode"), Some("Pincode must be 6 digits"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_field_errors_display_is_sorted_by_field() {
        let mut errors = FieldErrors::new();
        errors.insert("phone", "bad phone");
        errors.insert("city", "City is required");

        assert_eq!(errors.to_string(), "city: City is required; phone: bad phone");
    }

    #[test]
    fn test_field_errors_serialize_as_plain_object() {
        let err = DomainError::field("upi_id", "Please enter a valid UPI ID");

        let json = serde_json::to_value(err.field_errors().unwrap()).unwrap();

        assert_eq!(json["upi_id"], "Please enter a valid UPI ID");
    }
}
