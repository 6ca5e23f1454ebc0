//! Display formatting for rupee amounts.
//!
//! Amounts are kept at full precision everywhere. Rounding happens exactly
//! once, here, when a value is rendered for the user: half away from zero to
//! two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places shown to the user.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Rounds `amount` the way it will be displayed.
#[must_use]
pub fn round_for_display(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_DECIMAL_PLACES);
    rounded
}

/// Formats `amount` as Indian rupees with lakh/crore digit grouping,
/// e.g. `₹12,34,567.51`.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_for_display(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = rounded.abs().to_string();
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!("{sign}₹{}.{fraction}", group_indian(whole))
}

/// Groups the last three digits, then every two digits before them.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
