//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresEntitlementRepository` - User entitlement records with versioned updates
//! - `PostgresPaymentRecordRepository` - Canonical payment ledger

mod entitlement_repository;
mod payment_record_repository;

pub use entitlement_repository::PostgresEntitlementRepository;
pub use payment_record_repository::PostgresPaymentRecordRepository;
