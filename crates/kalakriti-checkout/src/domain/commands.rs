//! Commands for the Checkout context.

use kalakriti_core::command::Command;
use serde::Deserialize;
use uuid::Uuid;

use super::address::Address;
use super::payment::PaymentMethodData;
use super::steps::CheckoutStep;

/// Command to open checkout for a signed-in user and load their addresses.
#[derive(Debug, Clone)]
pub struct BeginCheckout {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The signed-in user.
    pub user_id: String,
}

/// Command to navigate to a step.
#[derive(Debug, Clone)]
pub struct GoToStep {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The requested step.
    pub step: CheckoutStep,
}

/// How the delivery address is chosen.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressSelection {
    /// A saved address, by address book id.
    Saved {
        /// Address book id.
        address_id: String,
    },
    /// An address entered in the form.
    Entered {
        /// The address.
        address: Address,
    },
}

/// Command to choose the delivery address.
#[derive(Debug, Clone)]
pub struct SelectAddress {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The chosen address.
    pub selection: AddressSelection,
}

/// Command to save a new address to the user's address book and select it.
#[derive(Debug, Clone)]
pub struct AddAddress {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The signed-in user.
    pub user_id: String,
    /// The address to save.
    pub address: Address,
}

/// Command to choose a payment method.
#[derive(Debug, Clone)]
pub struct SelectPayment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The method and its form data.
    pub payment: PaymentMethodData,
}

/// Command to confirm payment and create the order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The signed-in user.
    pub user_id: String,
}

/// Command to clear the error banner.
#[derive(Debug, Clone)]
pub struct DismissError {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

macro_rules! impl_command {
    ($($command:ty => $name:literal),+ $(,)?) => {
        $(
            impl Command for $command {
                fn command_type(&self) -> &'static str {
                    $name
                }

                fn correlation_id(&self) -> Uuid {
                    self.correlation_id
                }
            }
        )+
    };
}

impl_command! {
    BeginCheckout => "checkout.begin",
    GoToStep => "checkout.go_to",
    SelectAddress => "checkout.select_address",
    AddAddress => "checkout.add_address",
    SelectPayment => "checkout.select_payment",
    PlaceOrder => "checkout.place_order",
    DismissError => "checkout.dismiss_error",
}
