//! KalaKriti — Cart bounded context.
//!
//! Responsible for the session's line items, their persisted snapshot, and
//! the subtotal/shipping/tax/total derivation shown at every checkout step.

pub mod application;
pub mod domain;
