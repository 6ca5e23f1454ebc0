//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use kalakriti_cart::domain::pricing::PricingPolicy;
use kalakriti_checkout::application::command_handlers::Collaborators;
use kalakriti_core::clock::Clock;
use kalakriti_core::storage::KeyValueStore;
use kalakriti_session::application::command_handlers::SessionStore;
use kalakriti_test_support::{
    ApprovingPaymentGateway, FixedClock, MemoryStore, RecordingOrderService, StaticAddressBook,
};
use tower::ServiceExt;

use kalakriti_api::state::AppState;

/// Fixed date used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::on(2026, 1, 15))
}

/// Collaborators that accept every request.
pub fn approving_collaborators() -> Collaborators {
    Collaborators {
        address_book: Arc::new(StaticAddressBook::default()),
        orders: Arc::new(RecordingOrderService::new()),
        payments: Arc::new(ApprovingPaymentGateway::new()),
    }
}

/// Build state over an in-memory store with a fixed clock.
pub fn build_test_state(collaborators: Collaborators) -> AppState {
    build_test_state_on(Arc::new(MemoryStore::new()), collaborators)
}

/// Build state over `store` with a fixed clock.
pub fn build_test_state_on(store: Arc<dyn KeyValueStore>, collaborators: Collaborators) -> AppState {
    let sessions = Arc::new(SessionStore::load(Arc::clone(&store)));
    AppState::new(
        store,
        sessions,
        collaborators,
        fixed_clock(),
        PricingPolicy::default(),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    kalakriti_api::app(state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
