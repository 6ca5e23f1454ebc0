//! HTTP client for the storefront backend.
//!
//! Implements the checkout's address book, order service and payment
//! gateway contracts over the backend's JSON API.
//!
//! - Base URL: `http://127.0.0.1:8000/api/user` by default
//! - Authentication: `Authorization: Bearer <token>` from the signed-in session
//! - Order and payment requests carry an `Idempotency-Key` header

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kalakriti_checkout::domain::address::Address;
use kalakriti_checkout::domain::order::{
    OrderConfirmation, OrderRequest, PaymentReceipt, PaymentRequest,
};
use kalakriti_checkout::services::{AddressBook, OrderService, PaymentGateway};
use kalakriti_core::error::DomainError;
use kalakriti_session::application::command_handlers::SessionStore;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use crate::envelope;

/// Backend base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/user";

const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The backend answered `success: false`.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured base URL is not usable.
    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    /// No user is signed in, so there is no token to send.
    #[error("Not signed in")]
    NotSignedIn,
}

impl From<BackendError> for DomainError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::NotSignedIn => Self::Unauthenticated,
            BackendError::Url(e) => Self::Infrastructure(format!("invalid backend URL: {e}")),
            other => Self::External(other.to_string()),
        }
    }
}

/// Storefront backend client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    sessions: Arc<SessionStore>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the backend at `base_url`, authenticating as the
    /// user signed in to `sessions`.
    ///
    /// # Errors
    ///
    /// Returns error if `base_url` is not an absolute URL or the HTTP client
    /// fails to build.
    pub fn new(base_url: &str, sessions: Arc<SessionStore>) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url,
                sessions,
            }),
        })
    }

    /// The base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn token(&self) -> Result<String, BackendError> {
        self.inner
            .sessions
            .current()
            .map(|session| session.token)
            .ok_or(BackendError::NotSignedIn)
    }

    /// Execute an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.token()?)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute an authenticated POST request, optionally keyed for
    /// deduplication.
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let mut request = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.token()?)
            .json(body);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key.to_string());
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Unwrap the response envelope.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "backend response received");
        envelope::decode(status, &body)
    }
}

#[async_trait]
impl AddressBook for BackendClient {
    #[instrument(skip(self))]
    async fn list_addresses(&self, user_id: &str) -> Result<Vec<Address>, DomainError> {
        Ok(self.get("addresses").await?)
    }

    #[instrument(skip(self, address))]
    async fn add_address(&self, user_id: &str, address: &Address) -> Result<Address, DomainError> {
        Ok(self.post("addresses", address, None).await?)
    }
}

#[async_trait]
impl OrderService for BackendClient {
    #[instrument(skip(self, request), fields(idempotency_key = %request.idempotency_key))]
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, DomainError> {
        Ok(self
            .post("orders", request, Some(request.idempotency_key))
            .await?)
    }
}

#[async_trait]
impl PaymentGateway for BackendClient {
    #[instrument(skip(self, request), fields(idempotency_key = %request.idempotency_key))]
    async fn confirm_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt, DomainError> {
        Ok(self
            .post("payments/confirm", request, Some(request.idempotency_key))
            .await?)
    }
}
