//! Command abstractions.
//!
//! Every user action against the cart or checkout (add to cart, select an
//! address, place the order, ...) is expressed as a command value so that
//! handlers can log it uniformly and trace it across external calls.

use uuid::Uuid;

/// Trait that all cart, checkout and session commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable dotted name for this command, e.g. `"cart.add_item"`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}

/// Generates a fresh, time-ordered correlation ID for a new command.
#[must_use]
pub fn new_correlation_id() -> Uuid {
    Uuid::now_v7()
}
