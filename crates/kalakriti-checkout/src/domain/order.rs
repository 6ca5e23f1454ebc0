//! Requests and results exchanged with the order and payment services.

use kalakriti_cart::domain::aggregates::CartLineItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::Address;
use super::payment::{PaymentMethod, PaymentMethodData, PaymentSummary};

/// Payment confirmation request for a non-COD order.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    /// Same key as the order request; lets the gateway deduplicate retries.
    pub idempotency_key: Uuid,
    /// Amount to charge.
    pub amount: Decimal,
    /// Method-specific data as entered.
    pub data: PaymentMethodData,
}

/// Result of a successful payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Gateway reference for the confirmed payment.
    pub reference: String,
}

/// Order creation request.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// One key per checkout session; the order service creates at most one
    /// order per key.
    pub idempotency_key: Uuid,
    /// The signed-in user placing the order.
    pub user_id: String,
    /// Line items at the time of submission.
    pub items: Vec<CartLineItem>,
    /// Delivery address.
    pub address: Address,
    /// Method tag.
    pub payment_method: PaymentMethod,
    /// Redacted payment details.
    pub payment: PaymentSummary,
    /// Gateway reference, absent for cash on delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    /// Σ (unit price × quantity).
    pub subtotal: Decimal,
    /// Shipping charged.
    pub shipping: Decimal,
    /// Tax charged.
    pub tax: Decimal,
    /// Amount payable.
    pub total_amount: Decimal,
    /// Σ quantity.
    pub total_items: u64,
}

/// Result of a successful order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Server-assigned order id.
    #[serde(alias = "orderId")]
    pub order_id: String,
    /// Remaining confirmation payload, passed through for display.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl OrderConfirmation {
    /// A confirmation with no extra details.
    #[must_use]
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            details: serde_json::Map::new(),
        }
    }
}
