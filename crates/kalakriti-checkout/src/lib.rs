//! KalaKriti — Checkout bounded context.
//!
//! The four-step checkout state machine (cart review, delivery, payment,
//! confirmation), address and payment validation, and the contracts of the
//! external address book, payment gateway and order service.

pub mod application;
pub mod domain;
pub mod services;
