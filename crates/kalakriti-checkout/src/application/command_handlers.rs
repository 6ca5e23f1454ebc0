//! Command handlers for the Checkout context.
//!
//! `CheckoutService` owns the session's `CheckoutSession` and orchestrates
//! the external calls around it. The session lock is never held across an
//! `.await`; an outstanding order submission is tracked by a flag on the
//! session, set and cleared through [`SubmissionGuard`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kalakriti_cart::application::command_handlers::CartStore;
use kalakriti_cart::domain::commands::RemoveOrderedItems;
use kalakriti_cart::domain::pricing::PricingPolicy;
use kalakriti_core::clock::Clock;
use kalakriti_core::command::Command;
use kalakriti_core::error::DomainError;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::address::{Address, validate_address};
use crate::domain::aggregates::CheckoutSession;
use crate::domain::commands::{
    AddAddress, AddressSelection, BeginCheckout, DismissError, GoToStep, PlaceOrder,
    SelectAddress, SelectPayment,
};
use crate::domain::order::{OrderConfirmation, OrderRequest, PaymentRequest};
use crate::domain::steps::CheckoutStep;
use crate::services::{AddressBook, OrderService, PaymentGateway};

/// Banner shown when saved addresses cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load checkout data";

/// Banner shown when a new address cannot be saved.
pub const ADD_ADDRESS_FAILED_MESSAGE: &str = "Failed to add address";

/// Banner shown when payment confirmation or order creation fails.
pub const PAYMENT_FAILED_MESSAGE: &str = "Payment failed. Please try again.";

/// The external services a checkout talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Saved addresses.
    pub address_book: Arc<dyn AddressBook>,
    /// Order creation.
    pub orders: Arc<dyn OrderService>,
    /// Payment confirmation.
    pub payments: Arc<dyn PaymentGateway>,
}

/// Checkout for one user session.
pub struct CheckoutService {
    session: Mutex<CheckoutSession>,
    cart: Arc<CartStore>,
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
    pricing: PricingPolicy,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("session", &*self.lock())
            .field("pricing", &self.pricing)
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    /// Creates a checkout over `cart`, starting at cart review.
    #[must_use]
    pub fn new(
        cart: Arc<CartStore>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            session: Mutex::new(CheckoutSession::new(Uuid::new_v4())),
            cart,
            collaborators,
            clock,
            pricing,
        }
    }

    /// The cart this checkout orders from.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The pricing policy used for order totals.
    #[must_use]
    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Returns a copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> CheckoutSession {
        self.lock().clone()
    }

    /// Handles the `BeginCheckout` command: loads the user's saved addresses
    /// and pre-selects the default one.
    ///
    /// A completed session is replaced by a fresh one first. A failed address
    /// load is shown as a banner and does not fail the command.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SubmissionInFlight` while an order is being placed.
    #[instrument(skip(self, command), fields(user_id = %command.user_id))]
    pub async fn handle_begin(&self, command: &BeginCheckout) -> Result<(), DomainError> {
        {
            let mut session = self.lock();
            if session.is_submitting() {
                return Err(DomainError::SubmissionInFlight);
            }
            if session.is_complete() {
                *session = CheckoutSession::new(Uuid::new_v4());
            }
        }
        log_command(command);

        match self
            .collaborators
            .address_book
            .list_addresses(&command.user_id)
            .await
        {
            Ok(addresses) => {
                info!(count = addresses.len(), "loaded saved addresses");
                self.lock().record_saved_addresses(addresses);
            }
            Err(e) => {
                warn!(error = %e, "failed to load saved addresses");
                self.lock().set_error(LOAD_FAILED_MESSAGE);
            }
        }
        Ok(())
    }

    /// Handles the `GoToStep` command.
    ///
    /// # Errors
    ///
    /// Returns the `CheckoutSession::go_to` errors; the session is unchanged
    /// on error.
    #[instrument(skip(self, command), fields(step = command.step.number()))]
    pub fn handle_go_to(&self, command: &GoToStep) -> Result<CheckoutStep, DomainError> {
        log_command(command);
        let cart = self.cart.snapshot();
        let mut session = self.lock();
        session.go_to(command.step, &cart)?;
        Ok(session.current_step())
    }

    /// Handles the `SelectAddress` command.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unknown saved address id, and
    /// `CheckoutComplete` / `SubmissionInFlight` when the session cannot be
    /// edited.
    #[instrument(skip(self, command))]
    pub fn handle_select_address(&self, command: &SelectAddress) -> Result<(), DomainError> {
        log_command(command);
        let mut session = self.lock();
        match &command.selection {
            AddressSelection::Saved { address_id } => session.select_saved_address(address_id),
            AddressSelection::Entered { address } => session.select_address(address.clone()),
        }
    }

    /// Handles the `AddAddress` command: validates the address, saves it to
    /// the address book, then appends and selects the saved copy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` without calling the address book when
    /// the address is invalid, and `DomainError::External` (also shown as a
    /// banner) when saving fails.
    #[instrument(skip(self, command), fields(user_id = %command.user_id))]
    pub async fn handle_add_address(&self, command: &AddAddress) -> Result<Address, DomainError> {
        log_command(command);
        validate_address(&command.address).into_result()?;
        {
            let session = self.lock();
            if session.is_complete() {
                return Err(DomainError::CheckoutComplete);
            }
            if session.is_submitting() {
                return Err(DomainError::SubmissionInFlight);
            }
        }

        match self
            .collaborators
            .address_book
            .add_address(&command.user_id, &command.address)
            .await
        {
            Ok(saved) => {
                self.lock().add_saved_address(saved.clone())?;
                info!(address_id = ?saved.id, "address saved");
                Ok(saved)
            }
            Err(e) => {
                warn!(error = %e, "failed to save address");
                self.lock().set_error(ADD_ADDRESS_FAILED_MESSAGE);
                Err(DomainError::External(ADD_ADDRESS_FAILED_MESSAGE.into()))
            }
        }
    }

    /// Handles the `SelectPayment` command.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutComplete` / `SubmissionInFlight` when the session
    /// cannot be edited.
    #[instrument(skip(self, command), fields(method = ?command.payment.method()))]
    pub fn handle_select_payment(&self, command: &SelectPayment) -> Result<(), DomainError> {
        log_command(command);
        self.lock().select_payment(command.payment.clone())
    }

    /// Handles the `DismissError` command.
    #[instrument(skip(self, command))]
    pub fn handle_dismiss_error(&self, command: &DismissError) {
        log_command(command);
        self.lock().dismiss_error();
    }

    /// Handles the `PlaceOrder` command.
    ///
    /// Re-validates cart, address and payment, confirms the payment (skipped
    /// for cash on delivery), creates the order under the session's
    /// idempotency key, then takes the ordered lines out of the cart and moves
    /// to confirmation. Cart changes made while the order was in flight are
    /// kept.
    ///
    /// At most one submission is outstanding at a time. Dropping the returned
    /// future before it completes abandons the submission and leaves the
    /// session on the payment step, ready for a retry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SubmissionInFlight` when another submission is
    /// outstanding, `DomainError::CheckoutComplete` once an order exists,
    /// `DomainError::Validation` when any step's data fails, and
    /// `DomainError::External` (also shown as a banner) when payment or
    /// order creation fails.
    #[instrument(skip(self, command), fields(user_id = %command.user_id))]
    pub async fn handle_place_order(
        &self,
        command: &PlaceOrder,
    ) -> Result<OrderConfirmation, DomainError> {
        log_command(command);
        let cart = self.cart.snapshot();
        let (address, payment, idempotency_key, guard) = {
            let mut session = self.lock();
            let (address, payment) = session.prepare_submission(&cart, self.clock.as_ref())?;
            session.begin_submission()?;
            let key = session.idempotency_key();
            (address, payment, key, SubmissionGuard::new(&self.session))
        };
        let totals = self.pricing.compute(cart.subtotal());

        let payment_reference = if payment.method().requires_confirmation() {
            let request = PaymentRequest {
                idempotency_key,
                amount: totals.total,
                data: payment.clone(),
            };
            match self.collaborators.payments.confirm_payment(&request).await {
                Ok(receipt) => Some(receipt.reference),
                Err(e) => {
                    warn!(error = %e, "payment confirmation failed");
                    guard.fail(PAYMENT_FAILED_MESSAGE);
                    return Err(DomainError::External(PAYMENT_FAILED_MESSAGE.into()));
                }
            }
        } else {
            None
        };

        let request = OrderRequest {
            idempotency_key,
            user_id: command.user_id.clone(),
            items: cart.lines().to_vec(),
            address,
            payment_method: payment.method(),
            payment: payment.summary(),
            payment_reference,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            total_amount: totals.total,
            total_items: cart.total_items(),
        };
        let confirmation = match self.collaborators.orders.create_order(&request).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                warn!(error = %e, "order creation failed");
                guard.fail(PAYMENT_FAILED_MESSAGE);
                return Err(DomainError::External(PAYMENT_FAILED_MESSAGE.into()));
            }
        };

        guard.complete(confirmation.clone());
        let ordered = RemoveOrderedItems {
            correlation_id: command.correlation_id,
            items: request.items,
        };
        let cart = Arc::clone(&self.cart);
        if let Err(e) =
            tokio::task::spawn_blocking(move || cart.handle_remove_ordered_items(&ordered)).await
        {
            warn!(error = %e, "failed to take ordered items out of the cart");
        }
        info!(order_id = %confirmation.order_id, "order placed");
        Ok(confirmation)
    }

    fn lock(&self) -> MutexGuard<'_, CheckoutSession> {
        lock_session(&self.session)
    }
}

fn lock_session(session: &Mutex<CheckoutSession>) -> MutexGuard<'_, CheckoutSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn log_command(command: &impl Command) {
    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling checkout command"
    );
}

/// Clears the session's submitting flag when an order submission ends,
/// including when the submitting future is dropped mid-flight.
struct SubmissionGuard<'a> {
    session: &'a Mutex<CheckoutSession>,
    armed: bool,
}

impl<'a> SubmissionGuard<'a> {
    fn new(session: &'a Mutex<CheckoutSession>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn fail(mut self, message: &str) {
        self.armed = false;
        lock_session(self.session).fail_submission(message);
    }

    fn complete(mut self, confirmation: OrderConfirmation) {
        self.armed = false;
        lock_session(self.session).complete_submission(confirmation);
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("order submission abandoned before completion");
            lock_session(self.session).release_submission();
        }
    }
}
