//! ApproveCancellationHandler - Admin approval of a refund request.
//!
//! Downgrades to FREE and appends a refund entry. On the canonical side the
//! refunded subscription's record is marked refunded and a refunded record
//! is written for the refund entry itself.

use std::sync::Arc;

use crate::domain::entitlement::{EmbeddedPaymentEntry, EntitlementError, UserEntitlement};
use crate::domain::foundation::UserId;
use crate::domain::ledger::LedgerSync;
use crate::ports::{Clock, EntitlementRepository, PaymentRecordRepository};

use super::ledger_sync::{record_refund, sync_canonical};
use super::retry::{mutate_with_retry, Mutation};
use super::EntitlementPolicy;

#[derive(Debug, Clone)]
pub struct ApproveCancellationCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct ApproveCancellationResult {
    pub entitlement: UserEntitlement,
    /// The refund entry appended to the history.
    pub refund: EmbeddedPaymentEntry,
    /// The refunded subscription's record. `None` when there was no paid
    /// subscription to mirror.
    pub ledger: Option<LedgerSync>,
    /// The record written for the refund entry.
    pub refund_ledger: LedgerSync,
}

/// Handler for approving cancellations.
pub struct ApproveCancellationHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    payments: Arc<dyn PaymentRecordRepository>,
    clock: Arc<dyn Clock>,
    policy: EntitlementPolicy,
}

impl ApproveCancellationHandler {
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
        cmd: ApproveCancellationCommand,
    ) -> Result<ApproveCancellationResult, EntitlementError> {
        let now = self.clock.now();
        let (entitlement, outcome) = mutate_with_retry(
            self.entitlements.as_ref(),
            &cmd.user_id,
            self.policy.max_update_attempts,
            |record| {
                record
                    .approve_cancellation(&self.policy.refund_prefix, now)
                    .map(Mutation::Write)
            },
        )
        .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            transaction_id = %outcome.refund.transaction_id,
            amount = outcome.refund.amount,
            "Cancellation approved, plan downgraded to FREE"
        );

        let ledger = match outcome.refunded_entry.as_ref() {
            Some(original) => {
                Some(sync_canonical(self.payments.as_ref(), &cmd.user_id, original, now).await)
            }
            None => None,
        };
        let refund_ledger =
            record_refund(self.payments.as_ref(), &entitlement, &outcome.refund, now).await;

        Ok(ApproveCancellationResult {
            entitlement,
            refund: outcome.refund,
            ledger,
            refund_ledger,
        })
    }
}
