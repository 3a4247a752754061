//! RejectPaymentHandler - Admin rejection of a pending claim.

use std::sync::Arc;

use crate::domain::entitlement::{EmbeddedPaymentEntry, EntitlementError};
use crate::domain::foundation::{PaymentEntryId, UserId};
use crate::domain::ledger::LedgerSync;
use crate::ports::{Clock, EntitlementRepository, PaymentRecordRepository};

use super::ledger_sync::sync_canonical;
use super::retry::{mutate_with_retry, Mutation};
use super::EntitlementPolicy;

/// Command to reject one embedded entry.
#[derive(Debug, Clone)]
pub struct RejectPaymentCommand {
    pub user_id: UserId,
    pub entry_id: PaymentEntryId,
}

#[derive(Debug, Clone)]
pub struct RejectPaymentResult {
    pub entry: EmbeddedPaymentEntry,
    pub applied: bool,
    pub ledger: LedgerSync,
}

/// Handler for rejecting payments. Never changes the plan.
pub struct RejectPaymentHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    payments: Arc<dyn PaymentRecordRepository>,
    clock: Arc<dyn Clock>,
    policy: EntitlementPolicy,
}

impl RejectPaymentHandler {
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
        cmd: RejectPaymentCommand,
    ) -> Result<RejectPaymentResult, EntitlementError> {
        let now = self.clock.now();
        let (_, adjudication) = mutate_with_retry(
            self.entitlements.as_ref(),
            &cmd.user_id,
            self.policy.max_update_attempts,
            |record| {
                let adjudication = record.reject_payment(&cmd.entry_id, now)?;
                Ok(if adjudication.applied {
                    Mutation::Write(adjudication)
                } else {
                    Mutation::Keep(adjudication)
                })
            },
        )
        .await?;

        if adjudication.applied {
            tracing::info!(
                user_id = %cmd.user_id,
                entry_id = %cmd.entry_id,
                transaction_id = %adjudication.entry.transaction_id,
                "Payment rejected"
            );
        }

        let ledger = sync_canonical(
            self.payments.as_ref(),
            &cmd.user_id,
            &adjudication.entry,
            now,
        )
        .await;

        Ok(RejectPaymentResult {
            entry: adjudication.entry,
            applied: adjudication.applied,
            ledger,
        })
    }
}
