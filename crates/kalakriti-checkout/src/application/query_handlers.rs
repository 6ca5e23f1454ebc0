//! Query handlers for the Checkout context.

use kalakriti_cart::application::query_handlers::{CartView, cart_view};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers::CheckoutService;
use crate::domain::address::Address;
use crate::domain::order::OrderConfirmation;
use crate::domain::payment::{PaymentMethod, PaymentSummary};
use crate::domain::steps::{CheckoutStep, StepStatus};

/// One entry of the progress indicator.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    /// The step, serialized as its number.
    pub step: CheckoutStep,
    /// Display title.
    pub title: &'static str,
    /// Completed, active or pending.
    pub status: StepStatus,
}

/// Read-only view of a checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    /// The step being shown.
    pub current_step: CheckoutStep,
    /// Progress indicator, in step order.
    pub steps: Vec<StepView>,
    /// Cart lines and totals.
    pub cart: CartView,
    /// Saved addresses available for selection.
    pub saved_addresses: Vec<Address>,
    /// The selected delivery address.
    pub selected_address: Option<Address>,
    /// The selected payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Redacted details of the selected payment.
    pub payment: Option<PaymentSummary>,
    /// The created order, once confirmed.
    pub order_result: Option<OrderConfirmation>,
    /// Dismissable error banner.
    pub error: Option<String>,
    /// Whether an order submission is outstanding.
    pub submitting: bool,
    /// Key identifying this session's order.
    pub idempotency_key: Uuid,
}

/// Retrieves the current checkout state with the live cart.
#[must_use]
pub fn get_checkout(service: &CheckoutService) -> CheckoutView {
    let session = service.snapshot();
    let cart = service.cart().snapshot();
    CheckoutView {
        current_step: session.current_step(),
        steps: session
            .step_statuses()
            .into_iter()
            .map(|(step, status)| StepView {
                step,
                title: step.title(),
                status,
            })
            .collect(),
        cart: cart_view(&cart, service.pricing()),
        saved_addresses: session.saved_addresses().to_vec(),
        selected_address: session.selected_address().cloned(),
        payment_method: session.payment().map(|p| p.method()),
        payment: session.payment().map(|p| p.summary()),
        order_result: session.order_result().cloned(),
        error: session.last_error().map(str::to_owned),
        submitting: session.is_submitting(),
        idempotency_key: session.idempotency_key(),
    }
}
