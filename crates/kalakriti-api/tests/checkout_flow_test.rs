//! End-to-end checkout through the composed router.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use kalakriti_checkout::application::command_handlers::Collaborators;
use kalakriti_test_support::{ApprovingPaymentGateway, RecordingOrderService, valid_address};
use serde_json::json;

fn sign_in_body() -> serde_json::Value {
    json!({
        "user": { "id": "user-42", "name": "Ananya Sharma", "email": "ananya@example.com" },
        "token": "tok-42"
    })
}

#[tokio::test]
async fn test_card_checkout_from_empty_cart_to_confirmation() {
    let orders = Arc::new(RecordingOrderService::new());
    let payments = Arc::new(ApprovingPaymentGateway::new());
    let state = common::build_test_state(Collaborators {
        orders: orders.clone(),
        payments: payments.clone(),
        ..common::approving_collaborators()
    });
    let app = || common::build_test_app(state.clone());

    // Sign in and fill the cart: 2 × 475 = 950, free shipping, 18% tax.
    let (status, _) = common::post_json(app(), "/api/v1/session/sign-in", &sign_in_body()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = common::post_json(
        app(),
        "/api/v1/cart/add-item",
        &json!({
            "productId": "p-dhokra",
            "title": "Dhokra Brass Figurine",
            "unitPrice": "475",
            "quantity": 2,
            "imageRef": "dhokra.jpg"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart"]["totals"]["total"], "1121.00");

    // Begin, then walk through delivery to payment.
    let (status, _) = common::post_empty(app(), "/api/v1/checkout/begin").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = common::post_json(app(), "/api/v1/checkout/go-to", &json!({ "step": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = common::post_json(
        app(),
        "/api/v1/checkout/select-address",
        &json!({ "address": valid_address() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) =
        common::post_json(app(), "/api/v1/checkout/go-to", &json!({ "step": 3 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["steps"][0]["status"], "completed");
    assert_eq!(json["steps"][1]["status"], "completed");
    assert_eq!(json["steps"][2]["status"], "active");

    // Pay by card.
    let (status, json) = common::post_json(
        app(),
        "/api/v1/checkout/select-payment",
        &json!({
            "method": "card",
            "number": "4532 0151 1283 0366",
            "holder_name": "Ananya Sharma",
            "expiry_month": 12,
            "expiry_year": 2028,
            "cvv": "123"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["payment"]["last_four"], "0366");

    let (status, json) = common::post_empty(app(), "/api/v1/checkout/place-order").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["order_id"], "ORD-1");
    assert_eq!(json["checkout"]["current_step"], 4);
    assert!(!json.to_string().contains("4532015112830366"));

    // Exactly one order and one payment, under the same key, for the full amount.
    let order_requests = orders.requests();
    let payment_requests = payments.requests();
    assert_eq!(order_requests.len(), 1);
    assert_eq!(payment_requests.len(), 1);
    assert_eq!(order_requests[0].idempotency_key, payment_requests[0].idempotency_key);
    assert_eq!(order_requests[0].user_id, "user-42");
    assert_eq!(order_requests[0].payment_reference.as_deref(), Some("PAY-1"));
    assert_eq!(order_requests[0].total_amount.to_string(), "1121.00");

    // The cart is cleared and the checkout accepts no further changes.
    let (_, cart) = common::get_json(app(), "/api/v1/cart").await;
    assert_eq!(cart["total_items"], 0);
    let (status, json) = common::post_empty(app(), "/api/v1/checkout/place-order").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "checkout_complete");
    assert_eq!(orders.call_count(), 1);
}

#[tokio::test]
async fn test_expired_card_is_rejected_before_any_call() {
    let orders = Arc::new(RecordingOrderService::new());
    let state = common::build_test_state(Collaborators {
        orders: orders.clone(),
        ..common::approving_collaborators()
    });
    let app = || common::build_test_app(state.clone());
    common::post_json(app(), "/api/v1/session/sign-in", &sign_in_body()).await;
    common::post_json(
        app(),
        "/api/v1/cart/add-item",
        &json!({ "productId": "p1", "title": "Madhubani Print", "unitPrice": "300", "quantity": 1 }),
    )
    .await;
    common::post_json(app(), "/api/v1/checkout/go-to", &json!({ "step": 2 })).await;
    common::post_json(
        app(),
        "/api/v1/checkout/select-address",
        &json!({ "address": valid_address() }),
    )
    .await;
    common::post_json(app(), "/api/v1/checkout/go-to", &json!({ "step": 3 })).await;

    // The test clock is January 2026, so December 2025 has expired.
    common::post_json(
        app(),
        "/api/v1/checkout/select-payment",
        &json!({
            "method": "card",
            "number": "4532015112830366",
            "holder_name": "Ananya Sharma",
            "expiry_month": 12,
            "expiry_year": 2025,
            "cvv": "123"
        }),
    )
    .await;
    let (status, json) = common::post_empty(app(), "/api/v1/checkout/place-order").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["fields"]["card_expiry"], "Card has expired");
    assert_eq!(orders.call_count(), 0);
}

#[tokio::test]
async fn test_checkout_view_reflects_cart_changes() {
    let state = common::build_test_state(common::approving_collaborators());
    let app = || common::build_test_app(state.clone());

    common::post_json(
        app(),
        "/api/v1/cart/add-item",
        &json!({ "productId": "p1", "title": "Kalamkari Stole", "unitPrice": "250", "quantity": 1 }),
    )
    .await;
    let (_, json) = common::get_json(app(), "/api/v1/checkout").await;

    assert_eq!(json["cart"]["total_items"], 1);
    assert_eq!(json["cart"]["totals"]["shipping_display"], "₹50.00");
}
