//! ApprovePaymentHandler - Admin approval of a pending claim.
//!
//! The embedded entry is authoritative: once the record is written the
//! approval stands, whatever happens to the canonical sync afterwards.

use std::sync::Arc;

use crate::domain::entitlement::{EmbeddedPaymentEntry, EntitlementError, PaidPlan, UserEntitlement};
use crate::domain::foundation::{PaymentEntryId, UserId};
use crate::domain::ledger::LedgerSync;
use crate::ports::{Clock, EntitlementRepository, PaymentRecordRepository};

use super::ledger_sync::sync_canonical;
use super::retry::{mutate_with_retry, Mutation};
use super::EntitlementPolicy;

/// Command to approve one embedded entry.
#[derive(Debug, Clone)]
pub struct ApprovePaymentCommand {
    pub user_id: UserId,
    pub entry_id: PaymentEntryId,
    pub plan_type: PaidPlan,
}

/// Entitlement after approval plus how the canonical record fared.
#[derive(Debug, Clone)]
pub struct ApprovePaymentResult {
    pub entitlement: UserEntitlement,
    pub entry: EmbeddedPaymentEntry,
    /// False if the entry had already been decided.
    pub applied: bool,
    pub ledger: LedgerSync,
}

/// Handler for approving payments.
pub struct ApprovePaymentHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    payments: Arc<dyn PaymentRecordRepository>,
    clock: Arc<dyn Clock>,
    policy: EntitlementPolicy,
}

impl ApprovePaymentHandler {
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
        cmd: ApprovePaymentCommand,
    ) -> Result<ApprovePaymentResult, EntitlementError> {
        let now = self.clock.now();
        let (entitlement, adjudication) = mutate_with_retry(
            self.entitlements.as_ref(),
            &cmd.user_id,
            self.policy.max_update_attempts,
            |record| {
                let adjudication = record.approve_payment(
                    &cmd.entry_id,
                    cmd.plan_type,
                    self.policy.subscription_days,
                    now,
                )?;
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
                plan = %cmd.plan_type,
                "Payment approved"
            );
        } else {
            tracing::info!(
                user_id = %cmd.user_id,
                entry_id = %cmd.entry_id,
                status = adjudication.entry.status.as_str(),
                "Approve on decided entry, re-syncing ledger only"
            );
        }

        let ledger = sync_canonical(
            self.payments.as_ref(),
            &cmd.user_id,
            &adjudication.entry,
            now,
        )
        .await;

        Ok(ApprovePaymentResult {
            entitlement,
            entry: adjudication.entry,
            applied: adjudication.applied,
            ledger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::entitlement::test_support::{start, Fixture};
    use crate::domain::ledger::RecordStatus;
    use crate::domain::entitlement::{EntryStatus, Plan};

    fn handler(fx: &Fixture) -> ApprovePaymentHandler {
        ApprovePaymentHandler::new(
            fx.entitlements.clone(),
            fx.payments.clone(),
            fx.clock.clone(),
            fx.policy.clone(),
        )
    }

    fn cmd(user_id: &UserId, entry_id: PaymentEntryId, plan_type: PaidPlan) -> ApprovePaymentCommand {
        ApprovePaymentCommand {
            user_id: user_id.clone(),
            entry_id,
            plan_type,
        }
    }

    #[tokio::test]
    async fn approval_grants_plan_and_completes_record() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let entry_id = fx.claim(&user_id, "TXN1", 500).await;

        let result = handler(&fx)
            .handle(cmd(&user_id, entry_id, PaidPlan::ProMonthly))
            .await
            .unwrap();

        assert!(result.applied);
        assert_eq!(result.entry.status, EntryStatus::Approved);
        assert_eq!(result.entitlement.plan, Plan::ProMonthly);
        assert!(result.entitlement.is_pro);
        assert_eq!(result.entitlement.subscription_end_date, Some(start().add_days(30)));
        assert!(!result.ledger.is_divergent());
        assert_eq!(
            fx.canonical(&user_id, "TXN1").await.unwrap().status,
            RecordStatus::Completed
        );
    }

    #[tokio::test]
    async fn lifetime_has_no_end_date() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let entry_id = fx.claim(&user_id, "TXN1", 10000).await;

        let result = handler(&fx)
            .handle(cmd(&user_id, entry_id, PaidPlan::ProLifetime))
            .await
            .unwrap();
        assert_eq!(result.entitlement.plan, Plan::ProLifetime);
        assert!(result.entitlement.subscription_end_date.is_none());
    }

    #[tokio::test]
    async fn approval_clears_trial_dates() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let mut record = fx.record(&user_id).await;
        record.start_trial(30, start()).unwrap();
        fx.entitlements.put(record).await;
        let entry_id = fx.claim(&user_id, "TXN1", 500).await;

        let result = handler(&fx)
            .handle(cmd(&user_id, entry_id, PaidPlan::ProMonthly))
            .await
            .unwrap();
        assert!(result.entitlement.trial_start_date.is_none());
        assert!(result.entitlement.trial_end_date.is_none());
        assert!(result.entitlement.trial_redeemed_at.is_some());
    }

    #[tokio::test]
    async fn missing_canonical_record_still_grants() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let entry_id = fx.claim(&user_id, "TXN1", 500).await;
        fx.payments.forget(&user_id, "TXN1").await;

        let result = handler(&fx)
            .handle(cmd(&user_id, entry_id, PaidPlan::ProMonthly))
            .await
            .unwrap();
        assert_eq!(result.entitlement.plan, Plan::ProMonthly);
        assert_eq!(
            result.ledger,
            LedgerSync::RecordMissing {
                transaction_id: "TXN1".into()
            }
        );
    }

    #[tokio::test]
    async fn ledger_outage_still_grants() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let entry_id = fx.claim(&user_id, "TXN1", 500).await;
        fx.payments.fail_updates(true);

        let result = handler(&fx)
            .handle(cmd(&user_id, entry_id, PaidPlan::ProMonthly))
            .await
            .unwrap();
        assert!(matches!(result.ledger, LedgerSync::Failed { .. }));
        assert_eq!(fx.record(&user_id).await.plan, Plan::ProMonthly);
    }

    #[tokio::test]
    async fn second_approval_changes_nothing() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let entry_id = fx.claim(&user_id, "TXN1", 500).await;
        handler(&fx)
            .handle(cmd(&user_id, entry_id, PaidPlan::ProMonthly))
            .await
            .unwrap();
        let before = fx.record(&user_id).await;

        fx.clock.advance_days(3);
        let again = handler(&fx)
            .handle(cmd(&user_id, entry_id, PaidPlan::ProLifetime))
            .await
            .unwrap();

        assert!(!again.applied);
        assert_eq!(fx.record(&user_id).await, before);
        assert!(matches!(again.ledger, LedgerSync::Synced { changed: false, .. }));
    }

    #[tokio::test]
    async fn unknown_entry_is_not_found() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let missing = PaymentEntryId::new();
        let err = handler(&fx)
            .handle(cmd(&user_id, missing, PaidPlan::ProMonthly))
            .await
            .unwrap_err();
        assert_eq!(err, EntitlementError::EntryNotFound(missing));
    }
}
