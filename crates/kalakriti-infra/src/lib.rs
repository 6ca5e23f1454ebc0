//! KalaKriti Infrastructure — adapters behind the domain contracts.
//!
//! - [`file_store::FileKeyValueStore`]: durable `KeyValueStore` in a JSON file.
//! - [`backend::BackendClient`]: the storefront backend's HTTP JSON API,
//!   implementing the address book, order service and payment gateway.

pub mod backend;
pub mod envelope;
pub mod file_store;
