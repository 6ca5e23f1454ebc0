//! Routes for the Checkout bounded context.
//!
//! Every mutating route answers with the checkout view after the command,
//! so the UI can re-render from a single response.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use kalakriti_checkout::application::query_handlers::{self, CheckoutView};
use kalakriti_checkout::domain::address::Address;
use kalakriti_checkout::domain::commands::{self, AddressSelection};
use kalakriti_checkout::domain::order::OrderConfirmation;
use kalakriti_checkout::domain::payment::PaymentMethodData;
use kalakriti_checkout::domain::steps::CheckoutStep;
use kalakriti_core::command::new_correlation_id;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /go-to.
#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    /// Target step number, 1-4.
    pub step: CheckoutStep,
}

/// Response body for POST /add-address.
#[derive(Debug, Serialize)]
pub struct AddAddressResponse {
    /// The address as saved, with its assigned id.
    pub address: Address,
    /// The checkout after the address was selected.
    pub checkout: CheckoutView,
}

/// Response body for POST /place-order.
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    /// The created order.
    pub order: OrderConfirmation,
    /// The checkout, now on confirmation.
    pub checkout: CheckoutView,
}

fn view(state: &AppState) -> Json<CheckoutView> {
    Json(query_handlers::get_checkout(&state.checkout))
}

/// GET /
#[instrument(skip(state))]
async fn get_checkout(State(state): State<AppState>) -> Json<CheckoutView> {
    view(&state)
}

/// POST /begin
#[instrument(skip(state))]
async fn begin(State(state): State<AppState>) -> Result<Json<CheckoutView>, ApiError> {
    let user = state.sessions.require_user()?;
    let command = commands::BeginCheckout {
        correlation_id: new_correlation_id(),
        user_id: user.id,
    };

    info!(correlation_id = %command.correlation_id, "handling begin command");

    state.checkout.handle_begin(&command).await?;
    Ok(view(&state))
}

/// POST /go-to
#[instrument(skip(state, request), fields(step = request.step.number()))]
async fn go_to(
    State(state): State<AppState>,
    Json(request): Json<GoToRequest>,
) -> Result<Json<CheckoutView>, ApiError> {
    let command = commands::GoToStep {
        correlation_id: new_correlation_id(),
        step: request.step,
    };

    info!(correlation_id = %command.correlation_id, "handling go_to command");

    state.checkout.handle_go_to(&command)?;
    Ok(view(&state))
}

/// POST /select-address
#[instrument(skip(state, selection))]
async fn select_address(
    State(state): State<AppState>,
    Json(selection): Json<AddressSelection>,
) -> Result<Json<CheckoutView>, ApiError> {
    let command = commands::SelectAddress {
        correlation_id: new_correlation_id(),
        selection,
    };

    info!(correlation_id = %command.correlation_id, "handling select_address command");

    state.checkout.handle_select_address(&command)?;
    Ok(view(&state))
}

/// POST /add-address
#[instrument(skip(state, address))]
async fn add_address(
    State(state): State<AppState>,
    Json(address): Json<Address>,
) -> Result<Json<AddAddressResponse>, ApiError> {
    let user = state.sessions.require_user()?;
    let command = commands::AddAddress {
        correlation_id: new_correlation_id(),
        user_id: user.id,
        address,
    };

    info!(correlation_id = %command.correlation_id, "handling add_address command");

    let address = state.checkout.handle_add_address(&command).await?;
    Ok(Json(AddAddressResponse {
        address,
        checkout: query_handlers::get_checkout(&state.checkout),
    }))
}

/// POST /select-payment
#[instrument(skip(state, payment), fields(method = ?payment.method()))]
async fn select_payment(
    State(state): State<AppState>,
    Json(payment): Json<PaymentMethodData>,
) -> Result<Json<CheckoutView>, ApiError> {
    let command = commands::SelectPayment {
        correlation_id: new_correlation_id(),
        payment,
    };

    info!(correlation_id = %command.correlation_id, "handling select_payment command");

    state.checkout.handle_select_payment(&command)?;
    Ok(view(&state))
}

/// POST /place-order
#[instrument(skip(state))]
async fn place_order(State(state): State<AppState>) -> Result<Json<PlaceOrderResponse>, ApiError> {
    let user = state.sessions.require_user()?;
    let command = commands::PlaceOrder {
        correlation_id: new_correlation_id(),
        user_id: user.id,
    };

    info!(correlation_id = %command.correlation_id, "handling place_order command");

    let order = state.checkout.handle_place_order(&command).await?;
    Ok(Json(PlaceOrderResponse {
        order,
        checkout: query_handlers::get_checkout(&state.checkout),
    }))
}

/// POST /dismiss-error
#[instrument(skip(state))]
async fn dismiss_error(State(state): State<AppState>) -> Json<CheckoutView> {
    let command = commands::DismissError {
        correlation_id: new_correlation_id(),
    };

    info!(correlation_id = %command.correlation_id, "handling dismiss_error command");

    state.checkout.handle_dismiss_error(&command);
    view(&state)
}

/// Returns the router for the checkout context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_checkout))
        .route("/begin", post(begin))
        .route("/go-to", post(go_to))
        .route("/select-address", post(select_address))
        .route("/add-address", post(add_address))
        .route("/select-payment", post(select_payment))
        .route("/place-order", post(place_order))
        .route("/dismiss-error", post(dismiss_error))
}
