//! Application layer for the Cart context.

pub mod command_handlers;
pub mod query_handlers;
