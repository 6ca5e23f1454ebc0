//! Shared application state.

use std::sync::Arc;

use kalakriti_cart::application::command_handlers::CartStore;
use kalakriti_cart::domain::pricing::PricingPolicy;
use kalakriti_checkout::application::command_handlers::{CheckoutService, Collaborators};
use kalakriti_core::clock::{Clock, SystemClock};
use kalakriti_core::storage::KeyValueStore;
use kalakriti_infra::backend::BackendClient;
use kalakriti_infra::file_store::FileKeyValueStore;
use kalakriti_session::application::command_handlers::SessionStore;

use crate::config::AppConfig;
use crate::error::AppError;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The session's cart.
    pub cart: Arc<CartStore>,
    /// Checkout over `cart`.
    pub checkout: Arc<CheckoutService>,
    /// The signed-in user.
    pub sessions: Arc<SessionStore>,
    /// Shipping and tax parameters for cart views.
    pub pricing: PricingPolicy,
}

impl AppState {
    /// Create new application state. The cart is loaded from `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        sessions: Arc<SessionStore>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
        pricing: PricingPolicy,
    ) -> Self {
        let cart = Arc::new(CartStore::load(store));
        let checkout = Arc::new(CheckoutService::new(
            Arc::clone(&cart),
            collaborators,
            clock,
            pricing,
        ));
        Self {
            cart,
            checkout,
            sessions,
            pricing,
        }
    }

    /// Wire production state: file-backed stores, the HTTP backend and the
    /// system clock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the backend URL is unusable.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.store_path));
        let sessions = Arc::new(SessionStore::load(Arc::clone(&store)));
        let backend = Arc::new(
            BackendClient::new(&config.backend_url, Arc::clone(&sessions))
                .map_err(|e| AppError::Config(format!("KALAKRITI_BACKEND_URL: {e}")))?,
        );
        let collaborators = Collaborators {
            address_book: Arc::<BackendClient>::clone(&backend),
            orders: Arc::<BackendClient>::clone(&backend),
            payments: backend,
        };
        Ok(Self::new(
            store,
            sessions,
            collaborators,
            Arc::new(SystemClock),
            config.pricing,
        ))
    }
}
