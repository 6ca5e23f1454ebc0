//! Application layer for the Checkout context.

pub mod command_handlers;
pub mod query_handlers;
