//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait, auth types,
//! and error types that form the vocabulary of the entitlement domain.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{PaymentEntryId, PaymentRecordId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
