//! KalaKriti Core — shared domain abstractions.
//!
//! This crate defines the traits and types that the cart, checkout and
//! session contexts depend on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod money;
pub mod storage;
