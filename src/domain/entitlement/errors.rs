//! Entitlement-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | UserNotFound, EntryNotFound, NoRequestPending | 404 |
//! | AlreadyExists, AlreadySubscribed, TrialAlreadyUsed | 409 |
//! | RequestAlreadyPending, InvalidState, Conflict | 409 |
//! | NoActivePlan, Validation | 400 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentEntryId, UserId, ValidationError};

use super::Plan;

/// Errors returned by entitlement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    #[error("No entitlement record for user {0}")]
    UserNotFound(UserId),

    #[error("User {0} already has an entitlement record")]
    AlreadyExists(UserId),

    #[error("Payment entry {0} not found")]
    EntryNotFound(PaymentEntryId),

    #[error("Already subscribed to {plan}")]
    AlreadySubscribed { plan: Plan },

    #[error("Free trial has already been used")]
    TrialAlreadyUsed,

    #[error("No active plan to cancel")]
    NoActivePlan,

    #[error("A cancellation request is already pending")]
    RequestAlreadyPending,

    #[error("No pending cancellation request")]
    NoRequestPending,

    #[error("Cannot {attempted} while {current}")]
    InvalidState { current: String, attempted: String },

    #[error("Concurrent update on {0} did not settle, try again")]
    Conflict(String),

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl EntitlementError {
    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        EntitlementError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EntitlementError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        EntitlementError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EntitlementError::UserNotFound(_) => ErrorCode::UserNotFound,
            EntitlementError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            EntitlementError::EntryNotFound(_) => ErrorCode::EntryNotFound,
            EntitlementError::AlreadySubscribed { .. } => ErrorCode::AlreadySubscribed,
            EntitlementError::TrialAlreadyUsed => ErrorCode::TrialAlreadyUsed,
            EntitlementError::NoActivePlan => ErrorCode::NoActivePlan,
            EntitlementError::RequestAlreadyPending => ErrorCode::RequestAlreadyPending,
            EntitlementError::NoRequestPending => ErrorCode::NoRequestPending,
            EntitlementError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            EntitlementError::Conflict(_) => ErrorCode::ConcurrencyConflict,
            EntitlementError::Validation { .. } => ErrorCode::ValidationFailed,
            EntitlementError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EntitlementError::Conflict(_) | EntitlementError::Infrastructure(_)
        )
    }
}

impl From<ValidationError> for EntitlementError {
    fn from(err: ValidationError) -> Self {
        EntitlementError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for EntitlementError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrencyConflict => EntitlementError::Conflict(err.message),
            ErrorCode::ValidationFailed => EntitlementError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::InvalidStateTransition => EntitlementError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.message,
            },
            _ => EntitlementError::Infrastructure(err.to_string()),
        }
    }
}

impl From<EntitlementError> for DomainError {
    fn from(err: EntitlementError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
