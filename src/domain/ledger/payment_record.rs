//! Canonical payment records.
//!
//! The same monetary fact as an embedded entry, stored in its own
//! collection for admin reporting. Each record carries the id of the entry
//! it mirrors; rows written before that link existed only have
//! `(user_id, transaction_id)` to go on.

use serde::{Deserialize, Serialize};

use crate::domain::entitlement::{EmbeddedPaymentEntry, EntryStatus, PaidPlan, UserEntitlement};
use crate::domain::foundation::{PaymentEntryId, PaymentRecordId, Timestamp, UserId};

/// Status of a canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl RecordStatus {
    /// The canonical status that mirrors an embedded entry status.
    pub fn mirroring(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Pending => RecordStatus::Pending,
            EntryStatus::Approved => RecordStatus::Completed,
            EntryStatus::Rejected => RecordStatus::Failed,
            EntryStatus::Refunded => RecordStatus::Refunded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
            RecordStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RecordStatus::Pending),
            "completed" => Some(RecordStatus::Completed),
            "failed" => Some(RecordStatus::Failed),
            "refunded" => Some(RecordStatus::Refunded),
            _ => None,
        }
    }
}

/// A payment as the admin ledger sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: PaymentRecordId,
    /// The embedded entry this record mirrors. `None` on legacy rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<PaymentEntryId>,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub transaction_id: String,
    pub method: String,
    pub amount: i64,
    pub status: RecordStatus,
    pub plan_type: Option<PaidPlan>,
    pub date: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Mirrors a freshly submitted claim.
    pub fn pending_for(owner: &UserEntitlement, entry: &EmbeddedPaymentEntry) -> Self {
        Self {
            status: RecordStatus::Pending,
            ..Self::mirroring(owner, entry)
        }
    }

    /// Mirrors `entry` in whatever status it currently has.
    pub fn mirroring(owner: &UserEntitlement, entry: &EmbeddedPaymentEntry) -> Self {
        Self {
            id: PaymentRecordId::new(),
            entry_id: Some(entry.id),
            user_id: owner.user_id.clone(),
            user_name: owner.user_name.clone(),
            user_email: owner.user_email.clone(),
            transaction_id: entry.transaction_id.clone(),
            method: entry.method.clone(),
            amount: entry.amount,
            status: RecordStatus::mirroring(entry.status),
            plan_type: entry.plan_type,
            date: entry.date,
            updated_at: entry.date,
        }
    }

    /// True when this record stands for `entry`. Legacy rows without an
    /// entry link match on transaction id alone.
    pub fn mirrors(&self, entry: &EmbeddedPaymentEntry) -> bool {
        match self.entry_id {
            Some(id) => id == entry.id,
            None => self.transaction_id == entry.transaction_id,
        }
    }

    /// Sets the status. Returns false when it already had it.
    pub fn mark(&mut self, status: RecordStatus, now: Timestamp) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.updated_at = now;
        true
    }
}
