//! In-memory adapters.
//!
//! Used by tests and by local runs without a database.

mod entitlement_repository;
mod payment_record_repository;

pub use entitlement_repository::InMemoryEntitlementRepository;
pub use payment_record_repository::InMemoryPaymentRecordRepository;
