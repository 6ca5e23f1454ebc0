//! Shared test mocks and utilities for the KalaKriti storefront.

mod clock;
mod collaborators;
mod fixtures;
mod store;

pub use clock::FixedClock;
pub use collaborators::{
    ApprovingPaymentGateway, DecliningPaymentGateway, FailingAddressBook, FailingOrderService,
    RecordingOrderService, SlowOrderService, StallingOrderService, StaticAddressBook,
};
pub use fixtures::{line_item, valid_address};
pub use store::{FailingStore, MemoryStore};
