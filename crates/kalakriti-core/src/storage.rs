//! Durable key-value storage abstraction.
//!
//! Mirrors the browser's local storage contract: string keys, string values,
//! synchronous access. Callers treat missing or corrupt values as absent and
//! never let a failed write fail the in-memory mutation it accompanies.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::DomainError;

/// Storage key for the serialized cart line items.
pub const CART_STORAGE_KEY: &str = "kalakriti_cart";

/// Storage key for the serialized authenticated-user session payload.
pub const SESSION_STORAGE_KEY: &str = "kalakriti_session";

/// Durable string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), DomainError>;
}

/// Serializes `value` as JSON under `key`. Failures are logged and swallowed.
pub fn save_best_effort<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(key, error = %e, "failed to serialize value for storage");
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        warn!(key, error = %e, "failed to persist value; keeping in-memory state");
    }
}

/// Removes `key`. Failures are logged and swallowed.
pub fn remove_best_effort(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!(key, error = %e, "failed to remove stored value");
    }
}

/// Reads and deserializes the JSON value under `key`.
///
/// Returns `None` when the key is absent, the store fails, or the payload does
/// not parse. Failures are logged, never propagated.
pub fn load_best_effort<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read stored value");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding corrupt stored value");
            None
        }
    }
}
