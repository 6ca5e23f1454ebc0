//! Route modules organized by bounded context.

pub mod cart;
pub mod checkout;
pub mod health;
pub mod session;

use kalakriti_core::error::DomainError;

use crate::error::ApiError;

/// Runs a command handler that writes to the durable store on tokio's
/// blocking pool, off the async worker threads.
pub(crate) async fn run_blocking<T, F>(handler: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(handler).await.map_err(|e| {
        ApiError(DomainError::Infrastructure(format!(
            "command handler task failed: {e}"
        )))
    })
}
