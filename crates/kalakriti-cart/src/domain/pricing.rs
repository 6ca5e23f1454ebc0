//! Price computation: shipping, tax and total derived from a subtotal.
//!
//! A pure function of the cart subtotal, re-evaluated on every read. No
//! rounding happens here; see `kalakriti_core::money` for display rounding.

use rust_decimal::Decimal;
use serde::Serialize;

/// Subtotals strictly above this amount ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Shipping charged when the subtotal does not exceed the threshold.
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// GST applied to the subtotal (18%).
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Shipping and tax parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Decimal,
    /// Shipping fee below or at the threshold.
    pub flat_shipping_fee: Decimal,
    /// Fraction of the subtotal charged as tax.
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: FREE_SHIPPING_THRESHOLD,
            flat_shipping_fee: FLAT_SHIPPING_FEE,
            tax_rate: TAX_RATE,
        }
    }
}

impl PricingPolicy {
    /// Derives shipping, tax and total for `subtotal`.
    #[must_use]
    pub fn compute(&self, subtotal: Decimal) -> OrderTotals {
        let shipping = if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        };
        let tax = subtotal * self.tax_rate;
        OrderTotals {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            free_shipping_threshold: self.free_shipping_threshold,
        }
    }
}

/// Derived order amounts, at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    /// Σ (unit price × quantity).
    pub subtotal: Decimal,
    /// Zero above the free-shipping threshold, flat fee otherwise.
    pub shipping: Decimal,
    /// `subtotal × tax rate`.
    pub tax: Decimal,
    /// `subtotal + shipping + tax`.
    pub total: Decimal,
    #[serde(skip)]
    free_shipping_threshold: Decimal,
}

impl OrderTotals {
    /// Returns `true` when no shipping is charged.
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }

    /// How far the subtotal is from the free-shipping threshold, when shipping
    /// is being charged.
    #[must_use]
    pub fn free_shipping_shortfall(&self) -> Option<Decimal> {
        if self.ships_free() {
            None
        } else {
            Some((self.free_shipping_threshold - self.subtotal).max(Decimal::ZERO))
        }
    }
}

/// Derives totals for `subtotal` using the default policy.
#[must_use]
pub fn compute_totals(subtotal: Decimal) -> OrderTotals {
    PricingPolicy::default().compute(subtotal)
}
