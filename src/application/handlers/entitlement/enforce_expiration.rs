//! EnforceExpirationHandler - Lazy downgrade of lapsed plans.
//!
//! Runs ahead of every authenticated request. There is no background sweep:
//! a record is only downgraded when its owner next shows up.
//!
//! Reads fail the request; writes fail open. If the downgrade cannot be
//! persisted, the caller gets the record as it was loaded and the failure
//! is logged.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, Enforcement, UserEntitlement};
use crate::domain::foundation::UserId;
use crate::ports::{Clock, EntitlementRepository};

/// Query to check (and enforce) expiration for one user.
#[derive(Debug, Clone)]
pub struct EnforceExpirationCommand {
    pub user_id: UserId,
}

/// The record the rest of the request should see.
#[derive(Debug, Clone)]
pub struct EnforceExpirationResult {
    pub entitlement: UserEntitlement,
    pub enforcement: Enforcement,
    /// False when a needed change could not be written.
    pub persisted: bool,
}

/// Handler for lazy expiration.
pub struct EnforceExpirationHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl EnforceExpirationHandler {
    pub fn new(
        entitlements: Arc<dyn EntitlementRepository>,
        clock: Arc<dyn Clock>,
        max_attempts: u32,
    ) -> Self {
        Self {
            entitlements,
            clock,
            max_attempts,
        }
    }

    pub async fn handle(
        &self,
        cmd: EnforceExpirationCommand,
    ) -> Result<EnforceExpirationResult, EntitlementError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let loaded = self
                .entitlements
                .find_by_user_id(&cmd.user_id)
                .await?
                .ok_or_else(|| EntitlementError::UserNotFound(cmd.user_id.clone()))?;

            let mut record = loaded.clone();
            let enforcement = record.enforce_expiration(self.clock.now());
            if !enforcement.changed() {
                return Ok(EnforceExpirationResult {
                    entitlement: record,
                    enforcement,
                    persisted: true,
                });
            }

            match self.entitlements.update(&record).await {
                Ok(version) => {
                    record.version = version;
                    if let Enforcement::Downgraded { from } = enforcement {
                        tracing::info!(
                            user_id = %cmd.user_id,
                            from = %from,
                            "Lapsed plan downgraded to FREE"
                        );
                    }
                    return Ok(EnforceExpirationResult {
                        entitlement: record,
                        enforcement,
                        persisted: true,
                    });
                }
                Err(e) if e.is_conflict() && attempt < self.max_attempts.max(1) => {
                    tracing::debug!(user_id = %cmd.user_id, attempt, "Expiration write conflicted, retrying");
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %cmd.user_id,
                        error = %e,
                        "Could not persist expiration, serving stored entitlement"
                    );
                    return Ok(EnforceExpirationResult {
                        entitlement: loaded,
                        enforcement,
                        persisted: false,
                    });
                }
            }
        }
    }
}
