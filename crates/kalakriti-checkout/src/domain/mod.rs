//! Domain layer for the Checkout context.

pub mod address;
pub mod aggregates;
pub mod commands;
pub mod order;
pub mod payment;
pub mod steps;
