//! Mirrors embedded entry decisions onto the canonical payment records.

use crate::domain::entitlement::{EmbeddedPaymentEntry, UserEntitlement};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::ledger::{LedgerSync, PaymentRecord, RecordStatus};
use crate::ports::PaymentRecordRepository;

/// Brings the canonical record of `entry` to the status the entry implies.
///
/// The record is found by entry id, falling back to the transaction id for
/// legacy rows that carry no entry link. Never fails: storage problems come
/// back as `LedgerSync::Failed` and are logged, since the embedded entry
/// stays authoritative.
pub(crate) async fn sync_canonical(
    payments: &dyn PaymentRecordRepository,
    user_id: &UserId,
    entry: &EmbeddedPaymentEntry,
    now: Timestamp,
) -> LedgerSync {
    settle(payments, user_id, entry, None, now).await
}

/// Like `sync_canonical`, but writes the record when none exists yet.
///
/// Refund entries are created settled, so nothing else ever inserts their
/// canonical record.
pub(crate) async fn record_refund(
    payments: &dyn PaymentRecordRepository,
    owner: &UserEntitlement,
    refund: &EmbeddedPaymentEntry,
    now: Timestamp,
) -> LedgerSync {
    settle(payments, &owner.user_id, refund, Some(owner), now).await
}

async fn settle(
    payments: &dyn PaymentRecordRepository,
    user_id: &UserId,
    entry: &EmbeddedPaymentEntry,
    owner: Option<&UserEntitlement>,
    now: Timestamp,
) -> LedgerSync {
    let status = RecordStatus::mirroring(entry.status);
    let outcome = match locate_and_mark(payments, user_id, entry, status, owner, now).await {
        Ok(Some(sync)) => sync,
        Ok(None) => LedgerSync::RecordMissing {
            transaction_id: entry.transaction_id.clone(),
        },
        Err(e) => LedgerSync::Failed {
            transaction_id: entry.transaction_id.clone(),
            reason: e.to_string(),
        },
    };

    if outcome.is_divergent() {
        tracing::warn!(
            user_id = %user_id,
            entry_id = %entry.id,
            transaction_id = outcome.transaction_id(),
            expected = status.as_str(),
            sync = ?outcome,
            "Canonical payment record out of sync with entitlement"
        );
    }
    outcome
}

async fn locate_and_mark(
    payments: &dyn PaymentRecordRepository,
    user_id: &UserId,
    entry: &EmbeddedPaymentEntry,
    status: RecordStatus,
    owner: Option<&UserEntitlement>,
    now: Timestamp,
) -> Result<Option<LedgerSync>, DomainError> {
    let found = match payments.find_by_entry(user_id, &entry.id).await? {
        Some(record) => Some(record),
        None => payments
            .find_by_transaction(user_id, &entry.transaction_id)
            .await?
            .filter(|record| record.mirrors(entry)),
    };

    let changed = match found {
        Some(record) if record.status == status => false,
        Some(record) => {
            payments.update_status(&record.id, status, now).await?;
            true
        }
        None => {
            let Some(owner) = owner else {
                return Ok(None);
            };
            payments.insert(&PaymentRecord::mirroring(owner, entry)).await?;
            true
        }
    };

    Ok(Some(LedgerSync::Synced {
        transaction_id: entry.transaction_id.clone(),
        status,
        changed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPaymentRecordRepository;
    use crate::domain::entitlement::{EntryStatus, PaidPlan};

    fn owner() -> UserEntitlement {
        UserEntitlement::register(UserId::new("u-1").unwrap(), "A", "a@x.io", Timestamp::now())
    }

    fn claim(txn: &str) -> EmbeddedPaymentEntry {
        EmbeddedPaymentEntry::subscription_claim(
            txn,
            "bkash",
            500,
            PaidPlan::ProMonthly,
            Timestamp::now(),
        )
        .unwrap()
    }

    async fn seeded(entry: &EmbeddedPaymentEntry) -> (InMemoryPaymentRecordRepository, UserEntitlement) {
        let repo = InMemoryPaymentRecordRepository::new();
        let owner = owner();
        repo.insert(&PaymentRecord::pending_for(&owner, entry)).await.unwrap();
        (repo, owner)
    }

    fn decided(mut entry: EmbeddedPaymentEntry, status: EntryStatus) -> EmbeddedPaymentEntry {
        entry.transition(status).unwrap();
        entry
    }

    #[tokio::test]
    async fn marks_found_record() {
        let entry = claim("TXN1");
        let (repo, owner) = seeded(&entry).await;
        let approved = decided(entry, EntryStatus::Approved);

        let sync = sync_canonical(&repo, &owner.user_id, &approved, Timestamp::now()).await;
        assert_eq!(
            sync,
            LedgerSync::Synced {
                transaction_id: "TXN1".into(),
                status: RecordStatus::Completed,
                changed: true,
            }
        );
        let again = sync_canonical(&repo, &owner.user_id, &approved, Timestamp::now()).await;
        assert!(matches!(again, LedgerSync::Synced { changed: false, .. }));
    }

    #[tokio::test]
    async fn repeated_transaction_ids_sync_their_own_records() {
        let first = claim("TXN1");
        let second = claim("TXN1");
        let (repo, owner) = seeded(&first).await;
        repo.insert(&PaymentRecord::pending_for(&owner, &second)).await.unwrap();

        let approved = decided(first, EntryStatus::Approved);
        let rejected = decided(second, EntryStatus::Rejected);
        sync_canonical(&repo, &owner.user_id, &approved, Timestamp::now()).await;
        sync_canonical(&repo, &owner.user_id, &rejected, Timestamp::now()).await;

        for (entry, expected) in [
            (&approved, RecordStatus::Completed),
            (&rejected, RecordStatus::Failed),
        ] {
            let record = repo.find_by_entry(&owner.user_id, &entry.id).await.unwrap().unwrap();
            assert_eq!(record.status, expected);
        }
    }

    #[tokio::test]
    async fn legacy_records_match_on_transaction_id() {
        let entry = claim("TXN1");
        let repo = InMemoryPaymentRecordRepository::new();
        let owner = owner();
        repo.insert(&PaymentRecord {
            entry_id: None,
            ..PaymentRecord::pending_for(&owner, &entry)
        })
        .await
        .unwrap();

        let rejected = decided(entry, EntryStatus::Rejected);
        let sync = sync_canonical(&repo, &owner.user_id, &rejected, Timestamp::now()).await;
        assert!(matches!(sync, LedgerSync::Synced { changed: true, .. }));
    }

    #[tokio::test]
    async fn missing_record_is_reported() {
        let entry = claim("TXN1");
        let (repo, owner) = seeded(&entry).await;
        let other = decided(claim("OTHER"), EntryStatus::Rejected);
        let sync = sync_canonical(&repo, &owner.user_id, &other, Timestamp::now()).await;
        assert_eq!(sync, LedgerSync::RecordMissing { transaction_id: "OTHER".into() });
    }

    #[tokio::test]
    async fn refund_record_is_written_once() {
        let repo = InMemoryPaymentRecordRepository::new();
        let owner = owner();
        let refund = EmbeddedPaymentEntry::refund(
            "REF-1".into(),
            "nagad".into(),
            500,
            Some("TXN1".into()),
            Timestamp::now(),
        );

        let first = record_refund(&repo, &owner, &refund, Timestamp::now()).await;
        assert!(matches!(first, LedgerSync::Synced { changed: true, .. }));
        let second = record_refund(&repo, &owner, &refund, Timestamp::now()).await;
        assert!(matches!(second, LedgerSync::Synced { changed: false, .. }));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, RecordStatus::Refunded);
        assert_eq!(all[0].transaction_id, "REF-1");
    }

    #[tokio::test]
    async fn storage_failure_is_reported_not_raised() {
        let entry = claim("TXN1");
        let (repo, owner) = seeded(&entry).await;
        repo.fail_updates(true);
        let approved = decided(entry, EntryStatus::Approved);
        let sync = sync_canonical(&repo, &owner.user_id, &approved, Timestamp::now()).await;
        assert!(matches!(sync, LedgerSync::Failed { .. }));
    }
}
