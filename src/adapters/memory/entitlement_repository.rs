//! In-memory entitlement repository.
//!
//! Keeps the same version semantics as the Postgres adapter so handler
//! tests exercise the real conflict path. Failure switches let tests
//! simulate storage outages and lost races.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entitlement::UserEntitlement;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::EntitlementRepository;

/// Entitlement records held in a map keyed by user id.
#[derive(Clone, Default)]
pub struct InMemoryEntitlementRepository {
    records: Arc<RwLock<BTreeMap<UserId, UserEntitlement>>>,
    fail_writes: Arc<AtomicBool>,
    forced_conflicts: Arc<AtomicU32>,
}

impl InMemoryEntitlementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create`/`update` fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `count` updates lose the version race.
    pub fn force_conflicts(&self, count: u32) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    /// Overwrites a record without a version check, for seeding test state.
    pub async fn put(&self, record: UserEntitlement) {
        self.records
            .write()
            .await
            .insert(record.user_id.clone(), record);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("entitlement store unavailable"));
        }
        Ok(())
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn filtered(&self, keep: impl Fn(&UserEntitlement) -> bool) -> Vec<UserEntitlement> {
        self.records
            .read()
            .await
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryEntitlementRepository {
    async fn create(&self, record: &UserEntitlement) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        if records.contains_key(&record.user_id) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Entitlement for {} already exists", record.user_id),
            ));
        }
        records.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &UserEntitlement) -> Result<u64, DomainError> {
        self.check_writable()?;
        if self.take_forced_conflict() {
            return Err(DomainError::conflict(format!(
                "Entitlement for {} was modified concurrently",
                record.user_id
            )));
        }

        let mut records = self.records.write().await;
        let stored = records.get_mut(&record.user_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::UserNotFound,
                format!("No entitlement for {}", record.user_id),
            )
        })?;
        if stored.version != record.version {
            return Err(DomainError::conflict(format!(
                "Entitlement for {} is at version {}, not {}",
                record.user_id, stored.version, record.version
            )));
        }

        let mut next = record.clone();
        next.version = record.version + 1;
        *stored = next;
        Ok(record.version + 1)
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserEntitlement>, DomainError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<UserEntitlement>, DomainError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn list_with_pending_payments(&self) -> Result<Vec<UserEntitlement>, DomainError> {
        Ok(self.filtered(|r| r.pending_entries().next().is_some()).await)
    }

    async fn list_with_pending_cancellations(
        &self,
    ) -> Result<Vec<UserEntitlement>, DomainError> {
        Ok(self.filtered(UserEntitlement::has_pending_cancellation).await)
    }
}
