//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `EntitlementRepository` - Per-user entitlement documents, version-checked
//! - `PaymentRecordRepository` - Canonical payment records
//!
//! ## Infrastructure Ports
//!
//! - `Clock` - Current instant
//! - `SessionValidator` - Access token validation

mod clock;
mod entitlement_repository;
mod payment_record_repository;
mod session_validator;

pub use clock::Clock;
pub use entitlement_repository::EntitlementRepository;
pub use payment_record_repository::PaymentRecordRepository;
pub use session_validator::SessionValidator;
