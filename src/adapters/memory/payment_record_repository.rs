//! In-memory canonical payment record repository.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentEntryId, PaymentRecordId, Timestamp, UserId,
};
use crate::domain::ledger::{PaymentRecord, RecordStatus};
use crate::ports::PaymentRecordRepository;

/// Canonical records held in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryPaymentRecordRepository {
    records: Arc<RwLock<Vec<PaymentRecord>>>,
    fail_inserts: Arc<AtomicBool>,
    fail_updates: Arc<AtomicBool>,
}

impl InMemoryPaymentRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Removes a record without going through the port, to simulate a lost
    /// canonical write.
    pub async fn forget(&self, user_id: &UserId, transaction_id: &str) {
        self.records
            .write()
            .await
            .retain(|r| !(r.user_id == *user_id && r.transaction_id == transaction_id));
    }
}

#[async_trait]
impl PaymentRecordRepository for InMemoryPaymentRecordRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::database("payment ledger unavailable"));
        }
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_by_entry(
        &self,
        user_id: &UserId,
        entry_id: &PaymentEntryId,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.user_id == *user_id && r.entry_id == Some(*entry_id))
            .cloned())
    }

    async fn find_by_transaction(
        &self,
        user_id: &UserId,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .rev()
            .find(|r| r.user_id == *user_id && r.transaction_id == transaction_id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: &PaymentRecordId,
        status: RecordStatus,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DomainError::database("payment ledger unavailable"));
        }
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == *id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::PaymentRecordNotFound,
                format!("Payment record {} not found", id),
            )
        })?;
        record.mark(status, at);
        Ok(())
    }

    async fn delete(&self, id: &PaymentRecordId) -> Result<(), DomainError> {
        self.records.write().await.retain(|r| r.id != *id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<PaymentRecord>, DomainError> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::PaidPlan;

    fn record(user: &str, txn: &str, date: Timestamp) -> PaymentRecord {
        PaymentRecord {
            id: PaymentRecordId::new(),
            entry_id: None,
            user_id: UserId::new(user).unwrap(),
            user_name: user.into(),
            user_email: format!("{user}@example.com"),
            transaction_id: txn.into(),
            method: "bkash".into(),
            amount: 500,
            status: RecordStatus::Pending,
            plan_type: Some(PaidPlan::ProMonthly),
            date,
            updated_at: date,
        }
    }

    #[tokio::test]
    async fn lookup_is_scoped_to_user() {
        let repo = InMemoryPaymentRecordRepository::new();
        let now = Timestamp::now();
        repo.insert(&record("alice", "TXN1", now)).await.unwrap();
        repo.insert(&record("bob", "TXN1", now)).await.unwrap();

        let bob = UserId::new("bob").unwrap();
        let found = repo.find_by_transaction(&bob, "TXN1").await.unwrap().unwrap();
        assert_eq!(found.user_id, bob);
        assert!(repo
            .find_by_transaction(&UserId::new("carol").unwrap(), "TXN1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn entry_lookup_tells_repeated_transaction_ids_apart() {
        let repo = InMemoryPaymentRecordRepository::new();
        let now = Timestamp::now();
        let first = PaymentRecord {
            entry_id: Some(PaymentEntryId::new()),
            ..record("alice", "TXN1", now)
        };
        let second = PaymentRecord {
            entry_id: Some(PaymentEntryId::new()),
            ..record("alice", "TXN1", now)
        };
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let alice = UserId::new("alice").unwrap();
        let found = repo
            .find_by_entry(&alice, first.entry_id.as_ref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
        assert!(repo
            .find_by_entry(&UserId::new("bob").unwrap(), first.entry_id.as_ref().unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_status_changes_only_target() {
        let repo = InMemoryPaymentRecordRepository::new();
        let now = Timestamp::now();
        let a = record("alice", "TXN1", now);
        let b = record("alice", "TXN2", now);
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        repo.update_status(&a.id, RecordStatus::Completed, now).await.unwrap();

        let all = repo.list_all().await.unwrap();
        let by_txn = |t: &str| all.iter().find(|r| r.transaction_id == t).unwrap().status;
        assert_eq!(by_txn("TXN1"), RecordStatus::Completed);
        assert_eq!(by_txn("TXN2"), RecordStatus::Pending);
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_not_found() {
        let repo = InMemoryPaymentRecordRepository::new();
        let err = repo
            .update_status(&PaymentRecordId::new(), RecordStatus::Failed, Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentRecordNotFound);
    }

    #[tokio::test]
    async fn list_all_is_newest_first() {
        let repo = InMemoryPaymentRecordRepository::new();
        let now = Timestamp::now();
        repo.insert(&record("a", "OLD", now.minus_days(2))).await.unwrap();
        repo.insert(&record("a", "NEW", now)).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all[0].transaction_id, "NEW");
        assert_eq!(all[1].transaction_id, "OLD");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let repo = InMemoryPaymentRecordRepository::new();
        let rec = record("a", "TXN1", Timestamp::now());
        repo.insert(&rec).await.unwrap();
        repo.delete(&rec.id).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
