//! Delivery address value object and its validation.

use std::sync::LazyLock;

use kalakriti_core::error::FieldErrors;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Country every address ships to.
pub const DEFAULT_COUNTRY: &str = "India";

/// States and union territories accepted in the `state` field.
pub const INDIAN_STATES: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Delhi",
    "Chandigarh",
    "Dadra and Nagar Haveli",
    "Daman and Diu",
    "Jammu and Kashmir",
    "Ladakh",
    "Lakshadweep",
    "Puducherry",
    "Andaman and Nicobar Islands",
];

/// Indian mobile numbers: ten digits, leading 6-9.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("mobile pattern is valid"));

static PINCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("pincode pattern is valid"));

/// Kind of address, used as a label in the address book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    /// Home address.
    #[default]
    Home,
    /// Work address.
    Work,
    /// Anything else.
    Other,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_owned()
}

/// A delivery address.
///
/// Saved addresses are owned by the external address book; the checkout keeps
/// a value copy of the selected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address book identifier, assigned by the server on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Recipient name.
    #[serde(default)]
    pub full_name: String,
    /// Ten-digit mobile number.
    #[serde(default)]
    pub phone: String,
    /// First address line.
    #[serde(default)]
    pub address_line1: String,
    /// Optional second address line.
    #[serde(default)]
    pub address_line2: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or union territory, one of [`INDIAN_STATES`].
    #[serde(default)]
    pub state: String,
    /// Six-digit postal code.
    #[serde(default)]
    pub pincode: String,
    /// Country; always [`DEFAULT_COUNTRY`] unless the server says otherwise.
    #[serde(default = "default_country")]
    pub country: String,
    /// Optional nearby landmark.
    #[serde(default)]
    pub landmark: String,
    /// Whether this is the user's default address.
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,
    /// Address label.
    #[serde(default, rename = "type")]
    pub address_type: AddressType,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            id: None,
            full_name: String::new(),
            phone: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            country: default_country(),
            landmark: String::new(),
            is_default: false,
            address_type: AddressType::default(),
        }
    }
}

/// Checks every required field and pattern of `address`.
///
/// Returns an empty map when the address is valid.
#[must_use]
pub fn validate_address(address: &Address) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if address.full_name.trim().is_empty() {
        errors.insert("full_name", "Full name is required");
    }

    let phone = address.phone.trim();
    if phone.is_empty() {
        errors.insert("phone", "Phone number is required");
    } else if !MOBILE_PATTERN.is_match(phone) {
        errors.insert("phone", "Please enter a valid 10-digit mobile number");
    }

    if address.address_line1.trim().is_empty() {
        errors.insert("address_line1", "Address line 1 is required");
    }

    if address.city.trim().is_empty() {
        errors.insert("city", "City is required");
    }

    let state = address.state.trim();
    if state.is_empty() {
        errors.insert("state", "State is required");
    } else if !INDIAN_STATES.contains(&state) {
        errors.insert("state", "Please select a valid state");
    }

    let pincode = address.pincode.trim();
    if pincode.is_empty() {
        errors.insert("pincode", "Pincode is required");
    } else if !PINCODE_PATTERN.is_match(pincode) {
        errors.insert("pincode", "Pincode must be 6 digits");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_address() -> Address {
        Address {
            full_name: "Meera Iyer".into(),
            phone: "9876543210".into(),
            address_line1: "12 Temple Street".into(),
            city: "Chennai".into(),
            state: "Tamil Nadu".into(),
            pincode: "600004".into(),
            ..Address::default()
        }
    }

    #[test]
    fn test_valid_address_has_no_errors() {
        assert!(validate_address(&valid_address()).is_empty());
    }

    #[test]
    fn test_empty_address_reports_every_required_field() {
        // Arrange
        let address = Address::default();

        // Act
        let errors = validate_address(&address);

        // Assert
        assert_eq!(errors.len(), 6);
        assert_eq!(errors.get("full_name"), Some("Full name is required"));
        assert_eq!(errors.get("phone"), Some("Phone number is required"));
        assert_eq!(errors.get("address_line1"), Some("Address line 1 is required"));
        assert_eq!(errors.get("city"), Some("City is required"));
        assert_eq!(errors.get("state"), Some("State is required"));
        assert_eq!(errors.get("pincode"), Some("Pincode is required"));
    }

    #[test]
    fn test_short_phone_fails_pattern() {
        let address = Address {
            phone: "12345".into(),
            ..valid_address()
        };

        let errors = validate_address(&address);

        assert_eq!(
            errors.get("phone"),
            Some("Please enter a valid 10-digit mobile number")
        );
    }

    #[test]
    fn test_phone_must_start_with_six_to_nine() {
        let address = Address {
            phone: "5876543210".into(),
            ..valid_address()
        };

        assert!(validate_address(&address).contains("phone"));
    }

    #[test]
    fn test_four_digit_pincode_fails() {
        let address = Address {
            pincode: "4000".into(),
            ..valid_address()
        };

        let errors = validate_address(&address);

        assert_eq!(errors.get("pincode"), Some("Pincode must be 6 digits"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let address = Address {
            state: "Atlantis".into(),
            ..valid_address()
        };

        assert_eq!(
            validate_address(&address).get("state"),
            Some("Please select a valid state")
        );
    }

    #[test]
    fn test_whitespace_only_name_is_missing() {
        let address = Address {
            full_name: "   ".into(),
            ..valid_address()
        };

        assert!(validate_address(&address).contains("full_name"));
    }

    #[test]
    fn test_deserializes_backend_payload_with_defaults() {
        let json = r#"{"id":"a1","full_name":"Meera Iyer","phone":"9876543210","address_line1":"12 Temple Street","city":"Chennai","state":"Tamil Nadu","pincode":"600004","isDefault":true,"type":"work"}"#;

        let address: Address = serde_json::from_str(json).unwrap();

        assert_eq!(address.id.as_deref(), Some("a1"));
        assert!(address.is_default);
        assert_eq!(address.address_type, AddressType::Work);
        assert_eq!(address.country, DEFAULT_COUNTRY);
        assert!(validate_address(&address).is_empty());
    }
}
