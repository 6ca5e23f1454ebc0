//! Query handlers for the Cart context.
//!
//! Views carry amounts at full precision alongside their display strings.
//! The display strings are the only place rounding is applied.

use kalakriti_core::money::format_inr;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::command_handlers::CartStore;
use crate::domain::aggregates::{Cart, CartLineItem, ProductId};
use crate::domain::pricing::{OrderTotals, PricingPolicy};

/// Read-only view of one cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    /// The product identifier.
    pub product_id: ProductId,
    /// Product title.
    pub title: String,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Units in the cart.
    pub quantity: u32,
    /// `unit_price × quantity`.
    pub line_total: Decimal,
    /// Image reference for display.
    pub image_ref: String,
    /// Formatted unit price, e.g. `₹1,250.00`.
    pub unit_price_display: String,
    /// Formatted line total.
    pub line_total_display: String,
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        let unit_price = line.unit_price.amount();
        let line_total = line.line_total();
        Self {
            product_id: line.product_id.clone(),
            title: line.title.clone(),
            unit_price,
            quantity: line.quantity,
            line_total,
            image_ref: line.image_ref.clone(),
            unit_price_display: format_inr(unit_price),
            line_total_display: format_inr(line_total),
        }
    }
}

/// Read-only view of derived order totals.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    /// Full-precision amounts.
    #[serde(flatten)]
    pub amounts: OrderTotals,
    /// Formatted subtotal.
    pub subtotal_display: String,
    /// Formatted shipping, or `FREE` when none is charged.
    pub shipping_display: String,
    /// Formatted tax.
    pub tax_display: String,
    /// Formatted total.
    pub total_display: String,
    /// Amount still needed to qualify for free shipping, when shipping is charged.
    pub free_shipping_shortfall: Option<Decimal>,
}

impl From<OrderTotals> for TotalsView {
    fn from(amounts: OrderTotals) -> Self {
        let shipping_display = if amounts.ships_free() {
            "FREE".to_owned()
        } else {
            format_inr(amounts.shipping)
        };
        Self {
            subtotal_display: format_inr(amounts.subtotal),
            shipping_display,
            tax_display: format_inr(amounts.tax),
            total_display: format_inr(amounts.total),
            free_shipping_shortfall: amounts.free_shipping_shortfall(),
            amounts,
        }
    }
}

/// Read-only view of the cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    /// Lines in insertion order.
    pub items: Vec<CartItemView>,
    /// Σ quantity.
    pub total_items: u64,
    /// Derived totals for the current subtotal.
    pub totals: TotalsView,
}

/// Builds a view of `cart` priced with `policy`.
#[must_use]
pub fn cart_view(cart: &Cart, policy: &PricingPolicy) -> CartView {
    CartView {
        items: cart.lines().iter().map(CartItemView::from).collect(),
        total_items: cart.total_items(),
        totals: policy.compute(cart.subtotal()).into(),
    }
}

/// Retrieves the current cart with its derived totals.
#[must_use]
pub fn get_cart(store: &CartStore, policy: &PricingPolicy) -> CartView {
    cart_view(&store.snapshot(), policy)
}

/// Derives totals for the current cart contents.
#[must_use]
pub fn get_totals(store: &CartStore, policy: &PricingPolicy) -> OrderTotals {
    policy.compute(store.subtotal())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kalakriti_test_support::MemoryStore;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::{get_cart, get_totals};
    use crate::application::command_handlers::CartStore;
    use crate::domain::aggregates::{CartLineItem, ProductId, UnitPrice};
    use crate::domain::commands::AddItem;
    use crate::domain::pricing::PricingPolicy;

    fn store_with(lines: &[(&str, i64, u32)]) -> CartStore {
        let store = CartStore::load(Arc::new(MemoryStore::new()));
        for (id, price, quantity) in lines {
            store.handle_add_item(&AddItem {
                correlation_id: Uuid::new_v4(),
                item: CartLineItem {
                    product_id: ProductId::new(*id),
                    title: format!("Dokra {id}"),
                    unit_price: UnitPrice::new(Decimal::from(*price)).unwrap(),
                    quantity: *quantity,
                    image_ref: String::new(),
                },
            });
        }
        store
    }

    #[test]
    fn test_get_cart_returns_lines_and_totals() {
        // Arrange
        let store = store_with(&[("p1", 300, 1), ("p2", 100, 2)]);

        // Act
        let view = get_cart(&store, &PricingPolicy::default());

        // Assert
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total_items, 3);
        assert_eq!(view.items[1].line_total, Decimal::from(200));
        assert_eq!(view.totals.amounts.subtotal, Decimal::from(500));
        assert_eq!(view.totals.amounts.shipping, Decimal::from(50));
        assert_eq!(view.totals.total_display, "₹640.00");
        assert_eq!(view.totals.free_shipping_shortfall, Some(Decimal::ZERO));
    }

    #[test]
    fn test_free_shipping_is_displayed_as_free() {
        let store = store_with(&[("p1", 1500, 1)]);

        let view = get_cart(&store, &PricingPolicy::default());

        assert_eq!(view.totals.shipping_display, "FREE");
        assert_eq!(view.totals.total_display, "₹1,770.00");
        assert!(view.totals.free_shipping_shortfall.is_none());
    }

    #[test]
    fn test_empty_cart_still_charges_shipping() {
        let store = store_with(&[]);

        let totals = get_totals(&store, &PricingPolicy::default());

        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(50));
    }

    #[test]
    fn test_view_serializes_flattened_amounts() {
        let store = store_with(&[("p1", 100, 1)]);

        let json = serde_json::to_value(get_cart(&store, &PricingPolicy::default())).unwrap();

        assert_eq!(json["totals"]["subtotal"], "100");
        assert_eq!(json["totals"]["subtotal_display"], "₹100.00");
        assert_eq!(json["items"][0]["product_id"], "p1");
    }
}
