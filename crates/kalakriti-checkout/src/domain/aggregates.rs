//! Aggregate root for the Checkout context.
//!
//! `CheckoutSession` is the step state machine. It is synchronous and holds
//! no collaborators; the application layer feeds it the cart and the results
//! of external calls.

use std::collections::BTreeSet;

use kalakriti_cart::domain::aggregates::Cart;
use kalakriti_core::clock::Clock;
use kalakriti_core::error::{DomainError, FieldErrors};
use uuid::Uuid;

use super::address::{Address, validate_address};
use super::order::OrderConfirmation;
use super::payment::PaymentMethodData;
use super::steps::{CheckoutStep, StepStatus};

/// Field key and message reported when leaving cart review with no items.
pub const EMPTY_CART_FIELD: (&str, &str) = ("cart", "Your cart is empty");

/// Field key and message reported when no delivery address is selected.
pub const NO_ADDRESS_FIELD: (&str, &str) = ("address", "Please select a delivery address");

/// Field key and message reported when no payment method is selected.
pub const NO_PAYMENT_FIELD: (&str, &str) = ("payment", "Please select a payment method");

/// State of one checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    current_step: CheckoutStep,
    completed_steps: BTreeSet<CheckoutStep>,
    saved_addresses: Vec<Address>,
    selected_address: Option<Address>,
    payment: Option<PaymentMethodData>,
    order_result: Option<OrderConfirmation>,
    idempotency_key: Uuid,
    last_error: Option<String>,
    submitting: bool,
}

impl CheckoutSession {
    /// Starts a session at cart review.
    ///
    /// `idempotency_key` identifies this session's order to the order service.
    #[must_use]
    pub fn new(idempotency_key: Uuid) -> Self {
        Self {
            current_step: CheckoutStep::CartReview,
            completed_steps: BTreeSet::new(),
            saved_addresses: Vec::new(),
            selected_address: None,
            payment: None,
            order_result: None,
            idempotency_key,
            last_error: None,
            submitting: false,
        }
    }

    /// The step being shown.
    #[must_use]
    pub fn current_step(&self) -> CheckoutStep {
        self.current_step
    }

    /// Steps validated and left at least once.
    #[must_use]
    pub fn completed_steps(&self) -> &BTreeSet<CheckoutStep> {
        &self.completed_steps
    }

    /// Addresses loaded from, or added to, the address book.
    #[must_use]
    pub fn saved_addresses(&self) -> &[Address] {
        &self.saved_addresses
    }

    /// The delivery address, if one is selected.
    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        self.selected_address.as_ref()
    }

    /// The payment data, if a method is selected.
    #[must_use]
    pub fn payment(&self) -> Option<&PaymentMethodData> {
        self.payment.as_ref()
    }

    /// The created order, once confirmation is reached.
    #[must_use]
    pub fn order_result(&self) -> Option<&OrderConfirmation> {
        self.order_result.as_ref()
    }

    /// Key sent with the order and payment requests of this session.
    #[must_use]
    pub fn idempotency_key(&self) -> Uuid {
        self.idempotency_key
    }

    /// The dismissable error banner.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether an order submission is outstanding.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the session reached confirmation.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.order_result.is_some()
    }

    /// Progress-indicator status of every step.
    #[must_use]
    pub fn step_statuses(&self) -> Vec<(CheckoutStep, StepStatus)> {
        CheckoutStep::ALL
            .into_iter()
            .map(|step| {
                let status = if step == self.current_step {
                    StepStatus::Active
                } else if step < self.current_step || self.completed_steps.contains(&step) {
                    StepStatus::Completed
                } else {
                    StepStatus::Pending
                };
                (step, status)
            })
            .collect()
    }

    /// Moves to `target`.
    ///
    /// Backward moves and jumps to completed steps are always allowed. A
    /// forward move to the next step validates the current one and marks it
    /// completed. Confirmation is only reachable by placing the order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CheckoutComplete` once the session is terminal,
    /// `DomainError::SubmissionInFlight` while an order is being placed,
    /// `DomainError::Validation` when the current step's data does not
    /// validate, and `DomainError::InvalidTransition` for any other jump.
    /// The session is unchanged on error.
    pub fn go_to(&mut self, target: CheckoutStep, cart: &Cart) -> Result<(), DomainError> {
        self.ensure_editable()?;
        if target == CheckoutStep::Confirmation {
            return Err(DomainError::InvalidTransition(
                "confirmation is reached by placing the order".into(),
            ));
        }
        if target <= self.current_step || self.completed_steps.contains(&target) {
            self.current_step = target;
            return Ok(());
        }
        if self.current_step.next() != Some(target) {
            return Err(DomainError::InvalidTransition(format!(
                "cannot skip from {} to {}",
                self.current_step, target
            )));
        }
        self.step_errors(self.current_step, cart).into_result()?;
        self.completed_steps.insert(self.current_step);
        self.current_step = target;
        Ok(())
    }

    /// Replaces the saved address list and, when nothing is selected yet,
    /// selects the default address.
    pub fn record_saved_addresses(&mut self, addresses: Vec<Address>) {
        if self.selected_address.is_none() {
            self.selected_address = addresses.iter().find(|a| a.is_default).cloned();
        }
        self.saved_addresses = addresses;
    }

    /// Appends a freshly saved address and selects it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CheckoutComplete` or
    /// `DomainError::SubmissionInFlight` when the session cannot be edited.
    pub fn add_saved_address(&mut self, address: Address) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.selected_address = Some(address.clone());
        self.saved_addresses.push(address);
        Ok(())
    }

    /// Selects a delivery address by value.
    ///
    /// The address is validated when leaving the delivery step, not here.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CheckoutComplete` or
    /// `DomainError::SubmissionInFlight` when the session cannot be edited.
    pub fn select_address(&mut self, address: Address) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.selected_address = Some(address);
        Ok(())
    }

    /// Selects a saved address by its address book id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on the `address` field when no saved
    /// address has `address_id`, and the `select_address` errors otherwise.
    pub fn select_saved_address(&mut self, address_id: &str) -> Result<(), DomainError> {
        let address = self
            .saved_addresses
            .iter()
            .find(|a| a.id.as_deref() == Some(address_id))
            .cloned()
            .ok_or_else(|| DomainError::field(NO_ADDRESS_FIELD.0, NO_ADDRESS_FIELD.1))?;
        self.select_address(address)
    }

    /// Selects a payment method with its form data.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CheckoutComplete` or
    /// `DomainError::SubmissionInFlight` when the session cannot be edited.
    pub fn select_payment(&mut self, payment: PaymentMethodData) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.payment = Some(payment);
        Ok(())
    }

    /// Validates everything an order needs and returns the address and
    /// payment data to submit.
    ///
    /// All steps are re-checked, including ones reached by jumping back to a
    /// completed step, and every failing field is reported at once.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CheckoutComplete` or
    /// `DomainError::SubmissionInFlight` when the session cannot be edited,
    /// `DomainError::InvalidTransition` when not on the payment step, and
    /// `DomainError::Validation` with the merged field errors otherwise.
    pub fn prepare_submission(
        &self,
        cart: &Cart,
        clock: &dyn Clock,
    ) -> Result<(Address, PaymentMethodData), DomainError> {
        self.ensure_editable()?;
        if self.current_step != CheckoutStep::Payment {
            return Err(DomainError::InvalidTransition(format!(
                "orders are placed from {}, not {}",
                CheckoutStep::Payment,
                self.current_step
            )));
        }
        let mut errors = self.step_errors(CheckoutStep::CartReview, cart);
        errors.extend(self.step_errors(CheckoutStep::Delivery, cart));
        match &self.payment {
            Some(payment) => errors.extend(payment.validate(clock)),
            None => errors.insert(NO_PAYMENT_FIELD.0, NO_PAYMENT_FIELD.1),
        }
        errors.into_result()?;

        match (&self.selected_address, &self.payment) {
            (Some(address), Some(payment)) => Ok((address.clone(), payment.clone())),
            _ => Err(DomainError::InvalidTransition(
                "address and payment must be selected".into(),
            )),
        }
    }

    /// Marks an order submission as outstanding.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SubmissionInFlight` if one already is, and
    /// `DomainError::CheckoutComplete` once the session is terminal.
    pub fn begin_submission(&mut self) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.submitting = true;
        self.last_error = None;
        Ok(())
    }

    /// Records the created order and moves to the terminal step.
    pub fn complete_submission(&mut self, confirmation: OrderConfirmation) {
        self.submitting = false;
        self.completed_steps.insert(CheckoutStep::Payment);
        self.current_step = CheckoutStep::Confirmation;
        self.order_result = Some(confirmation);
        self.last_error = None;
    }

    /// Ends a failed submission, staying on the payment step with `message`
    /// as the banner.
    pub fn fail_submission(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.last_error = Some(message.into());
    }

    /// Ends an abandoned submission without touching any other state.
    pub fn release_submission(&mut self) {
        self.submitting = false;
    }

    /// Shows `message` as the banner.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Clears the banner.
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.is_complete() {
            return Err(DomainError::CheckoutComplete);
        }
        if self.submitting {
            return Err(DomainError::SubmissionInFlight);
        }
        Ok(())
    }

    fn step_errors(&self, step: CheckoutStep, cart: &Cart) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match step {
            CheckoutStep::CartReview => {
                if cart.is_empty() {
                    errors.insert(EMPTY_CART_FIELD.0, EMPTY_CART_FIELD.1);
                }
            }
            CheckoutStep::Delivery => match &self.selected_address {
                Some(address) => errors.extend(validate_address(address)),
                None => errors.insert(NO_ADDRESS_FIELD.0, NO_ADDRESS_FIELD.1),
            },
            CheckoutStep::Payment | CheckoutStep::Confirmation => {}
        }
        errors
    }
}
