//! Payment method data and its per-method validation.
//!
//! Payment data lives only for the checkout session. Anything leaving the
//! session for the order service goes through [`PaymentMethodData::summary`],
//! which never carries a full card number or CVV.

use std::fmt;
use std::sync::LazyLock;

use kalakriti_core::clock::Clock;
use kalakriti_core::error::FieldErrors;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Digits in an accepted card number.
pub const CARD_NUMBER_DIGITS: usize = 16;

/// Banks offered for net banking.
pub const SUPPORTED_BANKS: &[&str] = &[
    "State Bank of India",
    "HDFC Bank",
    "ICICI Bank",
    "Axis Bank",
    "Kotak Mahindra Bank",
    "Punjab National Bank",
    "Bank of Baroda",
    "Canara Bank",
    "Union Bank of India",
    "Bank of India",
];

/// Wallet provider ids offered for wallet payments.
pub const WALLET_PROVIDERS: &[&str] = &["paytm", "amazonpay", "mobikwik", "freecharge"];

static UPI_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.\-_]{2,256}@[a-zA-Z]{2,64}$").expect("UPI pattern is valid")
});

/// Payment method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Credit or debit card.
    Card,
    /// UPI transfer.
    Upi,
    /// Net banking.
    NetBanking,
    /// Digital wallet.
    Wallet,
    /// Cash on delivery.
    Cod,
}

impl PaymentMethod {
    /// Whether the method needs an upfront payment confirmation.
    #[must_use]
    pub fn requires_confirmation(self) -> bool {
        !matches!(self, Self::Cod)
    }
}

/// Card network, derived from the leading digit of the card number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardBrand {
    /// Leading 4.
    Visa,
    /// Leading 5 or 2.
    Mastercard,
    /// Leading 6.
    RuPay,
    /// Leading 3.
    #[serde(rename = "American Express")]
    AmericanExpress,
}

impl CardBrand {
    /// Detects the brand of a card number, ignoring whitespace.
    #[must_use]
    pub fn detect(number: &str) -> Option<Self> {
        match number.chars().find(|c| !c.is_whitespace())? {
            '4' => Some(Self::Visa),
            '5' | '2' => Some(Self::Mastercard),
            '6' => Some(Self::RuPay),
            '3' => Some(Self::AmericanExpress),
            _ => None,
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::RuPay => "RuPay",
            Self::AmericanExpress => "American Express",
        })
    }
}

/// Formats raw card input for display: digits only, at most 16, grouped by 4.
///
/// `"4532015112830366"` becomes `"4532 0151 1283 0366"`.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CARD_NUMBER_DIGITS)
        .collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Card number with whitespace removed, as validated and transmitted.
#[must_use]
pub fn normalize_card_number(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Card details as entered.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    /// Card number, possibly grouped with spaces.
    #[serde(default)]
    pub number: String,
    /// Name on the card.
    #[serde(default)]
    pub holder_name: String,
    /// Expiry month, 1-12.
    #[serde(default)]
    pub expiry_month: Option<u32>,
    /// Expiry year, four digits or two digits in the 2000s.
    #[serde(default)]
    pub expiry_year: Option<i32>,
    /// Card verification value.
    #[serde(default)]
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &format_args!("**** {}", self.last_four()))
            .field("holder_name", &self.holder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .finish()
    }
}

impl CardDetails {
    /// Last four digits of the card number.
    #[must_use]
    pub fn last_four(&self) -> String {
        let digits = normalize_card_number(&self.number);
        let skip = digits.chars().count().saturating_sub(4);
        digits.chars().skip(skip).collect()
    }

    /// The expiry as `(year, month)`, with two-digit years read as 20xx.
    fn expiry(&self) -> Option<(i32, u32)> {
        let month = self.expiry_month?;
        let year = self.expiry_year?;
        let year = if (0..100).contains(&year) { 2000 + year } else { year };
        Some((year, month))
    }

    fn validate(&self, clock: &dyn Clock, errors: &mut FieldErrors) {
        let number = normalize_card_number(&self.number);
        if number.len() != CARD_NUMBER_DIGITS || !number.chars().all(|c| c.is_ascii_digit()) {
            errors.insert("card_number", "Please enter a valid card number");
        }

        if self.holder_name.trim().is_empty() {
            errors.insert("card_holder", "Cardholder name is required");
        }

        match self.expiry() {
            None => errors.insert("card_expiry", "Please enter expiry date"),
            Some((_, month)) if !(1..=12).contains(&month) => {
                errors.insert("card_expiry", "Please enter a valid expiry date");
            }
            Some(expiry) if expiry < clock.year_month() => {
                errors.insert("card_expiry", "Card has expired");
            }
            Some(_) => {}
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.insert("card_cvv", "Please enter valid CVV");
        }
    }
}

/// UPI details as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiDetails {
    /// Virtual payment address, `user@provider`.
    #[serde(default)]
    pub upi_id: String,
}

/// Net banking account type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Savings account.
    #[default]
    Savings,
    /// Current account.
    Current,
}

/// Net banking details as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBankingDetails {
    /// One of [`SUPPORTED_BANKS`].
    #[serde(default)]
    pub bank: String,
    /// Account type.
    #[serde(default)]
    pub account_type: AccountType,
}

/// Wallet details as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDetails {
    /// One of [`WALLET_PROVIDERS`].
    #[serde(default)]
    pub provider: String,
    /// Phone number registered with the wallet.
    #[serde(default)]
    pub phone: String,
}

/// Cash on delivery acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodDetails {
    /// The customer ticked "I will pay on delivery".
    #[serde(default)]
    pub confirmed: bool,
}

/// Method-specific payment form data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentMethodData {
    /// Card payment.
    Card(CardDetails),
    /// UPI payment.
    Upi(UpiDetails),
    /// Net banking payment.
    NetBanking(NetBankingDetails),
    /// Wallet payment.
    Wallet(WalletDetails),
    /// Cash on delivery.
    Cod(CodDetails),
}

impl PaymentMethodData {
    /// The method tag of this data.
    #[must_use]
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::Card(_) => PaymentMethod::Card,
            Self::Upi(_) => PaymentMethod::Upi,
            Self::NetBanking(_) => PaymentMethod::NetBanking,
            Self::Wallet(_) => PaymentMethod::Wallet,
            Self::Cod(_) => PaymentMethod::Cod,
        }
    }

    /// Runs the method-specific checks. Card expiry is compared against the
    /// calendar month of `clock`.
    ///
    /// Returns an empty map when the data is valid.
    #[must_use]
    pub fn validate(&self, clock: &dyn Clock) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self {
            Self::Card(card) => card.validate(clock, &mut errors),
            Self::Upi(upi) => {
                if !UPI_ID_PATTERN.is_match(upi.upi_id.trim()) {
                    errors.insert("upi_id", "Please enter a valid UPI ID");
                }
            }
            Self::NetBanking(banking) => {
                if !SUPPORTED_BANKS.contains(&banking.bank.trim()) {
                    errors.insert("bank", "Please select your bank");
                }
            }
            Self::Wallet(wallet) => {
                if !WALLET_PROVIDERS.contains(&wallet.provider.trim()) {
                    errors.insert("wallet_provider", "Please select a wallet provider");
                }
                let phone = wallet.phone.trim();
                if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
                    errors.insert("wallet_phone", "Please enter a valid phone number");
                }
            }
            Self::Cod(cod) => {
                if !cod.confirmed {
                    errors.insert("cod_confirm", "Please confirm cash on delivery");
                }
            }
        }
        errors
    }

    /// A summary safe to store with the order.
    #[must_use]
    pub fn summary(&self) -> PaymentSummary {
        match self {
            Self::Card(card) => PaymentSummary::Card {
                brand: CardBrand::detect(&card.number),
                last_four: card.last_four(),
                holder_name: card.holder_name.trim().to_owned(),
            },
            Self::Upi(upi) => PaymentSummary::Upi {
                upi_id: upi.upi_id.trim().to_owned(),
            },
            Self::NetBanking(banking) => PaymentSummary::NetBanking {
                bank: banking.bank.trim().to_owned(),
                account_type: banking.account_type,
            },
            Self::Wallet(wallet) => PaymentSummary::Wallet {
                provider: wallet.provider.trim().to_owned(),
            },
            Self::Cod(_) => PaymentSummary::Cod,
        }
    }
}

/// Redacted payment details sent with an order and shown on confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentSummary {
    /// Card payment.
    Card {
        /// Detected network, if recognised.
        brand: Option<CardBrand>,
        /// Last four digits.
        last_four: String,
        /// Name on the card.
        holder_name: String,
    },
    /// UPI payment.
    Upi {
        /// Virtual payment address.
        upi_id: String,
    },
    /// Net banking payment.
    NetBanking {
        /// Bank name.
        bank: String,
        /// Account type.
        account_type: AccountType,
    },
    /// Wallet payment.
    Wallet {
        /// Wallet provider id.
        provider: String,
    },
    /// Cash on delivery.
    Cod,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use kalakriti_test_support::FixedClock;

    use super::*;

    fn october_2026() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap())
    }

    fn card(number: &str, month: u32, year: i32, cvv: &str) -> PaymentMethodData {
        PaymentMethodData::Card(CardDetails {
            number: number.into(),
            holder_name: "Arjun Rao".into(),
            expiry_month: Some(month),
            expiry_year: Some(year),
            cvv: cvv.into(),
        })
    }

    #[test]
    fn test_valid_grouped_card_passes() {
        let data = card("4532 0151 1283 0366", 12, 2028, "123");

        assert!(data.validate(&october_2026()).is_empty());
    }

    #[test]
    fn test_fifteen_digit_card_fails() {
        let data = card("453201511283036", 12, 2028, "123");

        let errors = data.validate(&october_2026());

        assert_eq!(errors.get("card_number"), Some("Please enter a valid card number"));
    }

    #[test]
    fn test_card_with_letters_fails() {
        let data = card("4532 0151 1283 03a6", 12, 2028, "123");

        assert!(data.validate(&october_2026()).contains("card_number"));
    }

    #[test]
    fn test_cvv_length_bounds() {
        let clock = october_2026();

        assert!(card("4532015112830366", 12, 2028, "12").validate(&clock).contains("card_cvv"));
        assert!(card("4532015112830366", 12, 2028, "1234").validate(&clock).is_empty());
        assert!(card("4532015112830366", 12, 2028, "12345").validate(&clock).contains("card_cvv"));
    }

    #[test]
    fn test_expiry_previous_month_fails_current_month_passes() {
        // Arrange
        let clock = october_2026();

        // Act
        let expired = card("4532015112830366", 9, 2026, "123").validate(&clock);
        let current = card("4532015112830366", 10, 2026, "123").validate(&clock);

        // Assert
        assert_eq!(expired.get("card_expiry"), Some("Card has expired"));
        assert!(current.is_empty());
    }

    #[test]
    fn test_two_digit_expiry_year_is_read_as_2000s() {
        let clock = october_2026();

        assert!(card("4532015112830366", 1, 27, "123").validate(&clock).is_empty());
        assert!(card("4532015112830366", 1, 25, "123").validate(&clock).contains("card_expiry"));
    }

    #[test]
    fn test_missing_and_invalid_expiry() {
        // Arrange
        let missing = PaymentMethodData::Card(CardDetails {
            number: "4532015112830366".into(),
            holder_name: "Arjun Rao".into(),
            expiry_month: None,
            expiry_year: Some(2028),
            cvv: "123".into(),
        });
        let thirteenth = card("4532015112830366", 13, 2028, "123");

        // Act
        let missing_errors = missing.validate(&october_2026());
        let invalid_errors = thirteenth.validate(&october_2026());

        // Assert
        assert_eq!(missing_errors.get("card_expiry"), Some("Please enter expiry date"));
        assert_eq!(
            invalid_errors.get("card_expiry"),
            Some("Please enter a valid expiry date")
        );
    }

    #[test]
    fn test_upi_pattern() {
        let clock = october_2026();
        let upi = |id: &str| PaymentMethodData::Upi(UpiDetails { upi_id: id.into() });

        assert!(upi("meera.iyer@okhdfc").validate(&clock).is_empty());
        assert!(upi("meera").validate(&clock).contains("upi_id"));
        assert!(upi("m@okhdfc").validate(&clock).contains("upi_id"));
        assert!(upi("meera@ok1").validate(&clock).contains("upi_id"));
    }

    #[test]
    fn test_net_banking_requires_supported_bank() {
        let clock = october_2026();
        let banking = |bank: &str| {
            PaymentMethodData::NetBanking(NetBankingDetails {
                bank: bank.into(),
                account_type: AccountType::Current,
            })
        };

        assert!(banking("HDFC Bank").validate(&clock).is_empty());
        assert_eq!(
            banking("").validate(&clock).get("bank"),
            Some("Please select your bank")
        );
        assert!(banking("Gringotts").validate(&clock).contains("bank"));
    }

    #[test]
    fn test_wallet_requires_provider_and_ten_digit_phone() {
        // Arrange
        let data = PaymentMethodData::Wallet(WalletDetails {
            provider: "phonepe".into(),
            phone: "98765".into(),
        });

        // Act
        let errors = data.validate(&october_2026());

        // Assert
        assert_eq!(errors.get("wallet_provider"), Some("Please select a wallet provider"));
        assert_eq!(errors.get("wallet_phone"), Some("Please enter a valid phone number"));
    }

    #[test]
    fn test_cod_requires_confirmation() {
        let clock = october_2026();

        let unconfirmed = PaymentMethodData::Cod(CodDetails { confirmed: false });
        let confirmed = PaymentMethodData::Cod(CodDetails { confirmed: true });

        assert_eq!(
            unconfirmed.validate(&clock).get("cod_confirm"),
            Some("Please confirm cash on delivery")
        );
        assert!(confirmed.validate(&clock).is_empty());
    }

    #[test]
    fn test_format_card_number_groups_by_four() {
        assert_eq!(format_card_number("4532015112830366"), "4532 0151 1283 0366");
        assert_eq!(format_card_number("4532-0151-12"), "4532 0151 12");
        assert_eq!(format_card_number("45320151128303669999"), "4532 0151 1283 0366");
    }

    #[test]
    fn test_card_brand_detection() {
        assert_eq!(CardBrand::detect("4532"), Some(CardBrand::Visa));
        assert_eq!(CardBrand::detect("5105"), Some(CardBrand::Mastercard));
        assert_eq!(CardBrand::detect("2221"), Some(CardBrand::Mastercard));
        assert_eq!(CardBrand::detect(" 6521"), Some(CardBrand::RuPay));
        assert_eq!(CardBrand::detect("3782"), Some(CardBrand::AmericanExpress));
        assert_eq!(CardBrand::detect("9999"), None);
        assert_eq!(CardBrand::detect(""), None);
    }

    #[test]
    fn test_card_summary_is_redacted() {
        // Arrange
        let data = card("4532 0151 1283 0366", 12, 2028, "123");

        // Act
        let json = serde_json::to_string(&data.summary()).unwrap();

        // Assert
        assert!(json.contains("\"last_four\":\"0366\""));
        assert!(json.contains("\"brand\":\"Visa\""));
        assert!(!json.contains("4532"));
        assert!(!json.contains("123"));
    }

    #[test]
    fn test_card_debug_output_hides_number_and_cvv() {
        let data = card("4532015112830366", 12, 2028, "987");

        let debug = format!("{data:?}");

        assert!(debug.contains("**** 0366"));
        assert!(!debug.contains("4532015112830366"));
        assert!(!debug.contains("987"));
    }

    #[test]
    fn test_payment_data_deserializes_by_method_tag() {
        let json = r#"{"method":"netbanking","bank":"ICICI Bank","account_type":"current"}"#;

        let data: PaymentMethodData = serde_json::from_str(json).unwrap();

        assert_eq!(data.method(), PaymentMethod::NetBanking);
        assert!(!PaymentMethod::Cod.requires_confirmation());
    }
}
