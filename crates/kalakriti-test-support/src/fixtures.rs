//! Ready-made domain values for tests.

use kalakriti_cart::domain::aggregates::{CartLineItem, ProductId, UnitPrice};
use kalakriti_checkout::domain::address::Address;
use rust_decimal::Decimal;

/// A cart line for `product_id` at `price` rupees per unit.
///
/// # Panics
///
/// Panics if `price` is negative.
#[must_use]
pub fn line_item(product_id: &str, price: i64, quantity: u32) -> CartLineItem {
    CartLineItem {
        product_id: ProductId::new(product_id),
        title: format!("Handcrafted {product_id}"),
        unit_price: UnitPrice::new(Decimal::from(price)).expect("fixture price is non-negative"),
        quantity,
        image_ref: format!("/media/products/{product_id}.jpg"),
    }
}

/// An address that passes every validation rule.
#[must_use]
pub fn valid_address() -> Address {
    Address {
        id: None,
        full_name: "Ananya Sharma".into(),
        phone: "9876543210".into(),
        address_line1: "221 MG Road".into(),
        address_line2: "Flat 3B".into(),
        city: "Bengaluru".into(),
        state: "Karnataka".into(),
        pincode: "560001".into(),
        landmark: "Near Trinity Metro".into(),
        ..Address::default()
    }
}
