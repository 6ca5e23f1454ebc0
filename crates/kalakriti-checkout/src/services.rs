//! External collaborators the checkout calls through narrow contracts.
//!
//! Implementations live in `kalakriti-infra` (HTTP) and
//! `kalakriti-test-support` (fakes).

use async_trait::async_trait;
use kalakriti_core::error::DomainError;

use crate::domain::address::Address;
use crate::domain::order::{OrderConfirmation, OrderRequest, PaymentReceipt, PaymentRequest};

/// The user's saved delivery addresses.
#[async_trait]
pub trait AddressBook: Send + Sync {
    /// Lists the saved addresses of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::External` if the address book cannot be reached
    /// or rejects the request.
    async fn list_addresses(&self, user_id: &str) -> Result<Vec<Address>, DomainError>;

    /// Saves `address` for `user_id` and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::External` if the address cannot be saved.
    async fn add_address(&self, user_id: &str, address: &Address) -> Result<Address, DomainError>;
}

/// Order creation.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Creates an order. Repeated calls with the same idempotency key must
    /// not create a second order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::External` if the order is not created.
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, DomainError>;
}

/// Payment confirmation.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Confirms the payment described by `request`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::External` if the payment is declined or the
    /// gateway cannot be reached.
    async fn confirm_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt, DomainError>;
}
