//! KalaKriti — local HTTP host for the storefront's cart and checkout.
//!
//! One process serves one shopper session: the cart, the checkout session
//! and the signed-in user live in [`state::AppState`] and are exposed as JSON
//! routes for the UI.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

/// Build the full router over `state`.
pub fn app(state: state::AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the storefront origin once it is configurable.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/cart", routes::cart::router())
        .nest("/api/v1/session", routes::session::router())
        .nest("/api/v1/checkout", routes::checkout::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
