//! Canonical payment record repository port.
//!
//! Lookups are scoped to the owning user: transaction ids are typed in by
//! clients and are not unique across users.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentEntryId, PaymentRecordId, Timestamp, UserId};
use crate::domain::ledger::{PaymentRecord, RecordStatus};

/// Repository port for the canonical payment collection.
#[async_trait]
pub trait PaymentRecordRepository: Send + Sync {
    /// Stores a new record.
    async fn insert(&self, record: &PaymentRecord) -> Result<(), DomainError>;

    /// Finds the record of `user_id` that mirrors the embedded entry `entry_id`.
    async fn find_by_entry(
        &self,
        user_id: &UserId,
        entry_id: &PaymentEntryId,
    ) -> Result<Option<PaymentRecord>, DomainError>;

    /// Finds the most recent record of `user_id` with `transaction_id`.
    ///
    /// Transaction ids may repeat within one user, so prefer `find_by_entry`.
    async fn find_by_transaction(
        &self,
        user_id: &UserId,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;

    /// Sets the status of one record.
    ///
    /// # Errors
    ///
    /// - `PaymentRecordNotFound` if the record vanished
    /// - `DatabaseError` on persistence failure
    async fn update_status(
        &self,
        id: &PaymentRecordId,
        status: RecordStatus,
        at: Timestamp,
    ) -> Result<(), DomainError>;

    /// Removes a record. Used to compensate a half-written submission.
    async fn delete(&self, id: &PaymentRecordId) -> Result<(), DomainError>;

    /// Every record, newest first.
    async fn list_all(&self) -> Result<Vec<PaymentRecord>, DomainError>;
}
