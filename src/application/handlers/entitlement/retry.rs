//! Optimistic read-modify-write over one entitlement record.

use crate::domain::entitlement::{EntitlementError, UserEntitlement};
use crate::domain::foundation::UserId;
use crate::ports::EntitlementRepository;

/// What a mutation closure decided.
pub(crate) enum Mutation<T> {
    /// The record changed and must be written.
    Write(T),
    /// Nothing changed; skip the write.
    Keep(T),
}

/// Loads the record, applies `apply` and writes it back with a version
/// check, reloading and re-applying on conflict.
///
/// `apply` must be a pure function of the record: it may run once per
/// attempt. Domain errors from `apply` are returned immediately.
pub(crate) async fn mutate_with_retry<T, F>(
    repository: &dyn EntitlementRepository,
    user_id: &UserId,
    max_attempts: u32,
    mut apply: F,
) -> Result<(UserEntitlement, T), EntitlementError>
where
    F: FnMut(&mut UserEntitlement) -> Result<Mutation<T>, EntitlementError>,
{
    for attempt in 1..=max_attempts.max(1) {
        let mut record = repository
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| EntitlementError::UserNotFound(user_id.clone()))?;

        let outcome = match apply(&mut record)? {
            Mutation::Keep(outcome) => return Ok((record, outcome)),
            Mutation::Write(outcome) => outcome,
        };

        match repository.update(&record).await {
            Ok(version) => {
                record.version = version;
                return Ok((record, outcome));
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(user_id = %user_id, attempt, "Entitlement update conflicted, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::warn!(user_id = %user_id, max_attempts, "Entitlement update kept conflicting");
    Err(EntitlementError::Conflict(user_id.to_string()))
}
