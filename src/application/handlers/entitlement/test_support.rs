//! Shared fixture for handler tests.

use std::sync::Arc;

use crate::adapters::clock::FixedClock;
use crate::adapters::memory::{InMemoryEntitlementRepository, InMemoryPaymentRecordRepository};
use crate::domain::entitlement::{EmbeddedPaymentEntry, PaidPlan, UserEntitlement};
use crate::domain::foundation::{PaymentEntryId, Timestamp, UserId};
use crate::domain::ledger::PaymentRecord;
use crate::ports::{EntitlementRepository, PaymentRecordRepository};

use super::EntitlementPolicy;

pub(crate) fn start() -> Timestamp {
    Timestamp::from_datetime(
        chrono::DateTime::parse_from_rfc3339("2024-06-01T09:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc),
    )
}

pub(crate) struct Fixture {
    pub entitlements: Arc<InMemoryEntitlementRepository>,
    pub payments: Arc<InMemoryPaymentRecordRepository>,
    pub clock: Arc<FixedClock>,
    pub policy: EntitlementPolicy,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            entitlements: Arc::new(InMemoryEntitlementRepository::new()),
            payments: Arc::new(InMemoryPaymentRecordRepository::new()),
            clock: Arc::new(FixedClock::at(start())),
            policy: EntitlementPolicy::default(),
        }
    }

    pub fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    pub async fn register(&self, id: &str) -> UserId {
        let user_id = Self::user(id);
        self.entitlements
            .create(&UserEntitlement::register(
                user_id.clone(),
                id,
                format!("{id}@example.com"),
                start(),
            ))
            .await
            .unwrap();
        user_id
    }

    pub async fn record(&self, user_id: &UserId) -> UserEntitlement {
        self.entitlements
            .find_by_user_id(user_id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Writes a pending claim to both facets, bypassing the submit handler.
    pub async fn claim(&self, user_id: &UserId, txn: &str, amount: i64) -> PaymentEntryId {
        let mut record = self.record(user_id).await;
        let entry = EmbeddedPaymentEntry::subscription_claim(
            txn,
            "bkash",
            amount,
            PaidPlan::ProMonthly,
            start(),
        )
        .unwrap();
        self.payments
            .insert(&PaymentRecord::pending_for(&record, &entry))
            .await
            .unwrap();
        let id = entry.id;
        record.record_claim(entry, start());
        self.entitlements.update(&record).await.unwrap();
        id
    }

    pub async fn canonical(&self, user_id: &UserId, txn: &str) -> Option<PaymentRecord> {
        self.payments.find_by_transaction(user_id, txn).await.unwrap()
    }
}
