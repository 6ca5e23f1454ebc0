//! Fake address book, order service and payment gateway implementations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kalakriti_checkout::domain::address::Address;
use kalakriti_checkout::domain::order::{
    OrderConfirmation, OrderRequest, PaymentReceipt, PaymentRequest,
};
use kalakriti_checkout::services::{AddressBook, OrderService, PaymentGateway};
use kalakriti_core::error::DomainError;

/// An address book that lists a fixed set of addresses and accepts every
/// new one, assigning ids `addr-1`, `addr-2`, ...
#[derive(Debug, Default)]
pub struct StaticAddressBook {
    addresses: Vec<Address>,
    added: Mutex<Vec<(String, Address)>>,
}

impl StaticAddressBook {
    /// Create an address book listing `addresses` for every user.
    #[must_use]
    pub fn new(addresses: Vec<Address>) -> Self {
        Self {
            addresses,
            added: Mutex::new(Vec::new()),
        }
    }

    /// Returns the `(user_id, address)` pairs passed to `add_address`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn added(&self) -> Vec<(String, Address)> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl AddressBook for StaticAddressBook {
    async fn list_addresses(&self, _user_id: &str) -> Result<Vec<Address>, DomainError> {
        Ok(self.addresses.clone())
    }

    async fn add_address(&self, user_id: &str, address: &Address) -> Result<Address, DomainError> {
        let mut added = self.added.lock().unwrap();
        added.push((user_id.to_owned(), address.clone()));
        let mut saved = address.clone();
        saved.id = Some(format!("addr-{}", added.len()));
        Ok(saved)
    }
}

/// An address book that is always unreachable.
#[derive(Debug)]
pub struct FailingAddressBook;

#[async_trait]
impl AddressBook for FailingAddressBook {
    async fn list_addresses(&self, _user_id: &str) -> Result<Vec<Address>, DomainError> {
        Err(DomainError::External("address service unavailable".into()))
    }

    async fn add_address(&self, _user_id: &str, _address: &Address) -> Result<Address, DomainError> {
        Err(DomainError::External("address service unavailable".into()))
    }
}

/// An order service that records every request and confirms it as
/// `ORD-1`, `ORD-2`, ...
#[derive(Debug, Default)]
pub struct RecordingOrderService {
    requests: Mutex<Vec<OrderRequest>>,
}

impl RecordingOrderService {
    /// Create a recording order service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every request received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of `create_order` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, request: &OrderRequest) -> OrderConfirmation {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        OrderConfirmation::new(format!("ORD-{}", requests.len()))
    }
}

#[async_trait]
impl OrderService for RecordingOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, DomainError> {
        Ok(self.record(request))
    }
}

/// An order service that yields to the scheduler several times before
/// recording the request, so concurrent submissions overlap.
#[derive(Debug)]
pub struct SlowOrderService {
    inner: RecordingOrderService,
    yields: usize,
}

impl SlowOrderService {
    /// Create an order service that yields `yields` times per call.
    #[must_use]
    pub fn new(yields: usize) -> Self {
        Self {
            inner: RecordingOrderService::new(),
            yields,
        }
    }

    /// Number of `create_order` calls that completed.
    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

#[async_trait]
impl OrderService for SlowOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, DomainError> {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        Ok(self.inner.record(request))
    }
}

/// An order service whose first call never completes; later calls succeed.
/// Used to abandon a submission mid-flight and then retry it.
#[derive(Debug, Default)]
pub struct StallingOrderService {
    inner: RecordingOrderService,
    attempts: AtomicUsize,
}

impl StallingOrderService {
    /// Create a stalling order service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `create_order` calls started, including the stalled one.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of `create_order` calls that completed.
    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

#[async_trait]
impl OrderService for StallingOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, DomainError> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        Ok(self.inner.record(request))
    }
}

/// An order service that always rejects the order.
#[derive(Debug)]
pub struct FailingOrderService;

#[async_trait]
impl OrderService for FailingOrderService {
    async fn create_order(&self, _request: &OrderRequest) -> Result<OrderConfirmation, DomainError> {
        Err(DomainError::External("Failed to create order".into()))
    }
}

/// A payment gateway that approves every payment as `PAY-1`, `PAY-2`, ...
#[derive(Debug, Default)]
pub struct ApprovingPaymentGateway {
    requests: Mutex<Vec<PaymentRequest>>,
}

impl ApprovingPaymentGateway {
    /// Create an approving gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every request received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ApprovingPaymentGateway {
    async fn confirm_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt, DomainError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(PaymentReceipt {
            reference: format!("PAY-{}", requests.len()),
        })
    }
}

/// A payment gateway that declines every payment.
#[derive(Debug)]
pub struct DecliningPaymentGateway;

#[async_trait]
impl PaymentGateway for DecliningPaymentGateway {
    async fn confirm_payment(&self, _request: &PaymentRequest) -> Result<PaymentReceipt, DomainError> {
        Err(DomainError::External("payment declined".into()))
    }
}
