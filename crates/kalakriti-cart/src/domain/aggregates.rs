//! Aggregate root for the Cart context.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque product identifier; unique key of a line within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wraps a catalog product identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Largest accepted unit price, in rupees.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Largest quantity a single cart line can hold; merges and updates clamp to it.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// Returned when a unit price is outside `0..=MAX_UNIT_PRICE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPrice {
    /// Below zero.
    #[error("unit price must not be negative: {0}")]
    Negative(Decimal),
    /// Above `MAX_UNIT_PRICE`.
    #[error("unit price must not exceed 10000000: {0}")]
    TooLarge(Decimal),
}

/// A per-unit price in rupees, between zero and `MAX_UNIT_PRICE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// Creates a unit price.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPrice` if `amount` is below zero or above
    /// `MAX_UNIT_PRICE`.
    pub fn new(amount: Decimal) -> Result<Self, InvalidPrice> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(InvalidPrice::Negative(amount));
        }
        if amount > MAX_UNIT_PRICE {
            return Err(InvalidPrice::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Returns the amount.
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for UnitPrice {
    type Error = InvalidPrice;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<UnitPrice> for Decimal {
    fn from(price: UnitPrice) -> Self {
        price.0
    }
}

/// One product entry in the cart.
///
/// Serialized with the storefront's camelCase field names; `price` and
/// `image` are accepted on load for snapshots written by older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Product title at the time it was added.
    pub title: String,
    /// Price per unit.
    #[serde(alias = "price")]
    pub unit_price: UnitPrice,
    /// Units of this product, always at least 1 once in a cart.
    pub quantity: u32,
    /// Opaque image reference used for display.
    #[serde(alias = "image", default)]
    pub image_ref: String,
}

impl CartLineItem {
    /// Returns `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.amount() * Decimal::from(self.quantity)
    }
}

/// The cart aggregate: line items in insertion order, keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from a persisted snapshot.
    ///
    /// Lines with a zero quantity are dropped and duplicate product ids are
    /// merged by summing quantities, so the aggregate invariants hold even for
    /// snapshots written by other clients.
    #[must_use]
    pub fn from_snapshot(lines: Vec<CartLineItem>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add_item(line);
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Returns `true` if the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds `item`, merging into an existing line with the same product id.
    /// The line's quantity is clamped to `MAX_LINE_QUANTITY`.
    ///
    /// Returns `false` (and changes nothing) when `item.quantity` is zero or
    /// the existing line is already full.
    pub fn add_item(&mut self, item: CartLineItem) -> bool {
        if item.quantity == 0 {
            return false;
        }
        match self.line_mut(&item.product_id) {
            Some(existing) => {
                let merged = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_LINE_QUANTITY);
                if merged == existing.quantity {
                    return false;
                }
                existing.quantity = merged;
            }
            None => self.lines.push(CartLineItem {
                quantity: item.quantity.min(MAX_LINE_QUANTITY),
                ..item
            }),
        }
        true
    }

    /// Deletes the line for `product_id`. Returns `false` if it was absent.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Sets the quantity of `product_id` to `quantity`.
    ///
    /// A quantity of zero or less removes the line; larger quantities are
    /// clamped to `MAX_LINE_QUANTITY`. Returns `false` when nothing changed
    /// (unknown product, or same quantity).
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }
        let quantity = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(MAX_LINE_QUANTITY);
        match self.line_mut(product_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Takes `ordered` out of the cart: each line's quantity drops by the
    /// ordered quantity of the same product, and lines that reach zero are
    /// removed. Lines and units not in `ordered` stay.
    ///
    /// Returns `false` if nothing changed.
    pub fn remove_ordered(&mut self, ordered: &[CartLineItem]) -> bool {
        let mut changed = false;
        for item in ordered {
            if let Some(line) = self.line_mut(&item.product_id) {
                line.quantity = line.quantity.saturating_sub(item.quantity);
                changed |= item.quantity > 0;
            }
        }
        self.lines.retain(|line| line.quantity > 0);
        changed
    }

    /// Empties the cart. Returns `false` if it was already empty.
    pub fn clear(&mut self) -> bool {
        let had_lines = !self.lines.is_empty();
        self.lines.clear();
        had_lines
    }

    /// Σ quantity over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Σ (unit price × quantity) over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    /// Quantity of `product_id` in the cart, 0 when absent.
    #[must_use]
    pub fn item_quantity(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    /// Returns `true` if the cart has a line for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }

    fn line(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|line| &line.product_id == product_id)
    }
}
