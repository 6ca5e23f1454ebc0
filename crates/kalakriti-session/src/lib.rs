//! KalaKriti — Session bounded context.
//!
//! Holds the signed-in user and their API token for the lifetime of the
//! local session, persisted so a restart keeps the user signed in.

pub mod application;
pub mod domain;
