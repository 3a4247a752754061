//! Entitlement repository port.
//!
//! Persists one `UserEntitlement` document per user with optimistic
//! concurrency on the `version` field.
//!
//! # Example
//!
//! ```ignore
//! let mut record = repo.find_by_user_id(&user_id).await?.ok_or(...)?;
//! record.start_trial(30, now)?;
//! match repo.update(&record).await {
//!     Ok(version) => record.version = version,
//!     Err(e) if e.is_conflict() => { /* reload and retry */ }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use async_trait::async_trait;

use crate::domain::entitlement::UserEntitlement;
use crate::domain::foundation::{DomainError, UserId};

/// Repository port for entitlement records.
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the user already has a record
    /// - `DatabaseError` on persistence failure
    async fn create(&self, record: &UserEntitlement) -> Result<(), DomainError>;

    /// Replaces a record if the stored version still equals `record.version`.
    ///
    /// Returns the new version.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if another writer got there first
    /// - `UserNotFound` if there is no record
    /// - `DatabaseError` on persistence failure
    async fn update(&self, record: &UserEntitlement) -> Result<u64, DomainError>;

    /// Finds the record of one user.
    async fn find_by_user_id(&self, user_id: &UserId)
        -> Result<Option<UserEntitlement>, DomainError>;

    /// Every record, ordered by user id.
    async fn list_all(&self) -> Result<Vec<UserEntitlement>, DomainError>;

    /// Records with at least one pending subscription claim.
    async fn list_with_pending_payments(&self) -> Result<Vec<UserEntitlement>, DomainError>;

    /// Records with a pending cancellation request.
    async fn list_with_pending_cancellations(&self)
        -> Result<Vec<UserEntitlement>, DomainError>;
}
