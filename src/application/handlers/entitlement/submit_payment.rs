//! SubmitPaymentHandler - Records a client payment claim in both facets.
//!
//! Writes the canonical record first, then appends the embedded entry. If
//! the append fails the canonical record is removed again and the whole
//! submission reports failure. The plan is never touched.

use std::sync::Arc;

use crate::domain::entitlement::{EmbeddedPaymentEntry, EntitlementError, PaidPlan};
use crate::domain::foundation::{PaymentRecordId, UserId};
use crate::domain::ledger::PaymentRecord;
use crate::ports::{Clock, EntitlementRepository, PaymentRecordRepository};

use super::retry::{mutate_with_retry, Mutation};
use super::EntitlementPolicy;

/// Command carrying the client's claim.
#[derive(Debug, Clone)]
pub struct SubmitPaymentCommand {
    pub user_id: UserId,
    pub transaction_id: String,
    pub method: String,
    pub amount: i64,
    pub plan_type: PaidPlan,
}

/// Acknowledgement of a stored claim.
#[derive(Debug, Clone)]
pub struct SubmitPaymentResult {
    pub entry: EmbeddedPaymentEntry,
    pub record_id: PaymentRecordId,
}

/// Handler for payment submissions.
pub struct SubmitPaymentHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    payments: Arc<dyn PaymentRecordRepository>,
    clock: Arc<dyn Clock>,
    policy: EntitlementPolicy,
}

impl SubmitPaymentHandler {
    pub fn new(
        entitlements: Arc<dyn EntitlementRepository>,
        payments: Arc<dyn PaymentRecordRepository>,
        clock: Arc<dyn Clock>,
        policy: EntitlementPolicy,
    ) -> Self {
        Self {
            entitlements,
            payments,
            clock,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitPaymentCommand,
    ) -> Result<SubmitPaymentResult, EntitlementError> {
        let now = self.clock.now();
        let entry = EmbeddedPaymentEntry::subscription_claim(
            cmd.transaction_id,
            cmd.method,
            cmd.amount,
            cmd.plan_type,
            now,
        )?;

        let owner = self
            .entitlements
            .find_by_user_id(&cmd.user_id)
            .await?
            .ok_or_else(|| EntitlementError::UserNotFound(cmd.user_id.clone()))?;

        let canonical = PaymentRecord::pending_for(&owner, &entry);
        self.payments.insert(&canonical).await?;

        let appended = mutate_with_retry(
            self.entitlements.as_ref(),
            &cmd.user_id,
            self.policy.max_update_attempts,
            |record| {
                record.record_claim(entry.clone(), now);
                Ok(Mutation::Write(()))
            },
        )
        .await;

        if let Err(e) = appended {
            if let Err(cleanup) = self.payments.delete(&canonical.id).await {
                tracing::warn!(
                    user_id = %cmd.user_id,
                    transaction_id = %entry.transaction_id,
                    error = %cleanup,
                    "Orphaned canonical payment record after failed submission"
                );
            }
            return Err(e);
        }

        tracing::info!(
            user_id = %cmd.user_id,
            entry_id = %entry.id,
            transaction_id = %entry.transaction_id,
            amount = entry.amount,
            plan = %cmd.plan_type,
            "Payment claim submitted"
        );
        Ok(SubmitPaymentResult {
            entry,
            record_id: canonical.id,
        })
    }
}
