//! Routes for the Cart bounded context.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use kalakriti_cart::application::command_handlers::CartCommandResult;
use kalakriti_cart::application::query_handlers::{self, CartView};
use kalakriti_cart::domain::aggregates::{CartLineItem, ProductId};
use kalakriti_cart::domain::commands;
use kalakriti_core::command::new_correlation_id;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::run_blocking;
use crate::state::AppState;

/// Request body for POST /update-quantity.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    /// The product whose line is updated.
    pub product_id: ProductId,
    /// New absolute quantity; zero or less removes the line.
    pub quantity: i64,
}

/// Request body for POST /remove-item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    /// The product to remove.
    pub product_id: ProductId,
}

/// Response body returned after a cart command.
#[derive(Debug, Serialize)]
pub struct CartCommandResponse {
    /// Correlation ID of the handled command.
    pub correlation_id: Uuid,
    /// Whether the cart contents changed.
    pub changed: bool,
    /// The cart after the command.
    pub cart: CartView,
}

fn respond(state: &AppState, result: CartCommandResult) -> Json<CartCommandResponse> {
    Json(CartCommandResponse {
        correlation_id: result.correlation_id,
        changed: result.changed,
        cart: query_handlers::get_cart(&state.cart, &state.pricing),
    })
}

/// GET /
#[instrument(skip(state))]
async fn get_cart(State(state): State<AppState>) -> Json<CartView> {
    Json(query_handlers::get_cart(&state.cart, &state.pricing))
}

/// POST /add-item
#[instrument(skip(state, item), fields(product_id = %item.product_id))]
async fn add_item(
    State(state): State<AppState>,
    Json(item): Json<CartLineItem>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::AddItem {
        correlation_id: new_correlation_id(),
        item,
    };

    info!(correlation_id = %command.correlation_id, "handling add_item command");

    let cart = Arc::clone(&state.cart);
    let result = run_blocking(move || cart.handle_add_item(&command)).await?;
    Ok(respond(&state, result))
}

/// POST /update-quantity
#[instrument(skip(state, request), fields(product_id = %request.product_id))]
async fn update_quantity(
    State(state): State<AppState>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::UpdateQuantity {
        correlation_id: new_correlation_id(),
        product_id: request.product_id,
        quantity: request.quantity,
    };

    info!(correlation_id = %command.correlation_id, "handling update_quantity command");

    let cart = Arc::clone(&state.cart);
    let result = run_blocking(move || cart.handle_update_quantity(&command)).await?;
    Ok(respond(&state, result))
}

/// POST /remove-item
#[instrument(skip(state, request), fields(product_id = %request.product_id))]
async fn remove_item(
    State(state): State<AppState>,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::RemoveItem {
        correlation_id: new_correlation_id(),
        product_id: request.product_id,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_item command");

    let cart = Arc::clone(&state.cart);
    let result = run_blocking(move || cart.handle_remove_item(&command)).await?;
    Ok(respond(&state, result))
}

/// POST /clear
#[instrument(skip(state))]
async fn clear(State(state): State<AppState>) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::ClearCart {
        correlation_id: new_correlation_id(),
    };

    info!(correlation_id = %command.correlation_id, "handling clear command");

    let cart = Arc::clone(&state.cart);
    let result = run_blocking(move || cart.handle_clear(&command)).await?;
    Ok(respond(&state, result))
}

/// Returns the router for the cart context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/add-item", post(add_item))
        .route("/update-quantity", post(update_quantity))
        .route("/remove-item", post(remove_item))
        .route("/clear", post(clear))
}
