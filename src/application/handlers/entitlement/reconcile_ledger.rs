//! ReconcileLedgerHandler - Operator repair of canonical records.
//!
//! Re-applies the status every decided entry implies to its canonical
//! record. Refund records that were never written are written now; a lost
//! subscription record is only reported. Use it after a sync warning was
//! logged.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::UserId;
use crate::domain::ledger::LedgerSync;
use crate::ports::{Clock, EntitlementRepository, PaymentRecordRepository};

use super::ledger_sync::{record_refund, sync_canonical};

#[derive(Debug, Clone)]
pub struct ReconcileLedgerCommand {
    pub user_id: UserId,
}

/// Transaction ids grouped by what reconciliation found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileLedgerResult {
    pub checked: usize,
    pub in_sync: Vec<String>,
    pub repaired: Vec<String>,
    pub missing: Vec<String>,
    pub failed: Vec<String>,
}

pub struct ReconcileLedgerHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    payments: Arc<dyn PaymentRecordRepository>,
    clock: Arc<dyn Clock>,
}

impl ReconcileLedgerHandler {
    pub fn new(
        entitlements: Arc<dyn EntitlementRepository>,
        payments: Arc<dyn PaymentRecordRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entitlements,
            payments,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileLedgerCommand,
    ) -> Result<ReconcileLedgerResult, EntitlementError> {
        let record = self
            .entitlements
            .find_by_user_id(&cmd.user_id)
            .await?
            .ok_or_else(|| EntitlementError::UserNotFound(cmd.user_id.clone()))?;
        let now = self.clock.now();

        let mut result = ReconcileLedgerResult::default();
        for entry in record.payment_history.iter().filter(|e| e.status.is_decided()) {
            result.checked += 1;
            let sync = if entry.is_subscription() {
                sync_canonical(self.payments.as_ref(), &cmd.user_id, entry, now).await
            } else {
                record_refund(self.payments.as_ref(), &record, entry, now).await
            };

            let bucket = match sync {
                LedgerSync::Synced { changed: true, .. } => &mut result.repaired,
                LedgerSync::Synced { changed: false, .. } => &mut result.in_sync,
                LedgerSync::RecordMissing { .. } => &mut result.missing,
                LedgerSync::Failed { .. } => &mut result.failed,
            };
            bucket.push(entry.transaction_id.clone());
        }

        tracing::info!(
            user_id = %cmd.user_id,
            checked = result.checked,
            repaired = result.repaired.len(),
            missing = result.missing.len(),
            failed = result.failed.len(),
            "Ledger reconciled"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::entitlement::test_support::{start, Fixture};
    use crate::domain::entitlement::{CancellationRequest, PaidPlan};
    use crate::domain::ledger::RecordStatus;

    fn handler(fx: &Fixture) -> ReconcileLedgerHandler {
        ReconcileLedgerHandler::new(
            fx.entitlements.clone(),
            fx.payments.clone(),
            fx.clock.clone(),
        )
    }

    #[tokio::test]
    async fn repairs_stale_records_and_reports_missing_ones() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let approved = fx.claim(&user_id, "TXN1", 500).await;
        let rejected = fx.claim(&user_id, "TXN2", 199).await;
        let lost = fx.claim(&user_id, "TXN3", 199).await;
        fx.claim(&user_id, "TXN4", 199).await;

        // Decide entries directly so the canonical side is left stale.
        let mut record = fx.record(&user_id).await;
        record.approve_payment(&approved, PaidPlan::ProMonthly, 30, start()).unwrap();
        record.reject_payment(&rejected, start()).unwrap();
        record.reject_payment(&lost, start()).unwrap();
        fx.entitlements.put(record).await;
        fx.payments.forget(&user_id, "TXN3").await;

        let handler = handler(&fx);
        let result = handler
            .handle(ReconcileLedgerCommand {
                user_id: user_id.clone(),
            })
            .await
            .unwrap();

        assert_eq!(result.checked, 3);
        assert_eq!(result.repaired, vec!["TXN1", "TXN2"]);
        assert_eq!(result.missing, vec!["TXN3"]);
        assert_eq!(
            fx.canonical(&user_id, "TXN1").await.unwrap().status,
            RecordStatus::Completed
        );

        let second = handler
            .handle(ReconcileLedgerCommand { user_id })
            .await
            .unwrap();
        assert_eq!(second.in_sync, vec!["TXN1", "TXN2"]);
        assert!(second.repaired.is_empty());
    }

    #[tokio::test]
    async fn repeated_transaction_ids_end_up_on_separate_records() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let first = fx.claim(&user_id, "TXN1", 500).await;
        let second = fx.claim(&user_id, "TXN1", 500).await;

        let mut record = fx.record(&user_id).await;
        record.approve_payment(&first, PaidPlan::ProMonthly, 30, start()).unwrap();
        record.reject_payment(&second, start()).unwrap();
        fx.entitlements.put(record).await;

        let result = handler(&fx)
            .handle(ReconcileLedgerCommand {
                user_id: user_id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(result.repaired, vec!["TXN1", "TXN1"]);

        let approved = fx.payments.find_by_entry(&user_id, &first).await.unwrap().unwrap();
        let rejected = fx.payments.find_by_entry(&user_id, &second).await.unwrap().unwrap();
        assert_eq!(approved.status, RecordStatus::Completed);
        assert_eq!(rejected.status, RecordStatus::Failed);

        let again = handler(&fx)
            .handle(ReconcileLedgerCommand { user_id })
            .await
            .unwrap();
        assert_eq!(again.in_sync, vec!["TXN1", "TXN1"]);
    }

    #[tokio::test]
    async fn lost_refund_record_is_written() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let paid = fx.claim(&user_id, "TXN1", 500).await;

        let mut record = fx.record(&user_id).await;
        record.approve_payment(&paid, PaidPlan::ProMonthly, 30, start()).unwrap();
        record
            .request_cancellation(
                CancellationRequest::new("", "bkash", "017XXXXXXX", start()).unwrap(),
                start(),
            )
            .unwrap();
        let refund = record.approve_cancellation("REF-", start()).unwrap().refund;
        fx.entitlements.put(record).await;

        let result = handler(&fx)
            .handle(ReconcileLedgerCommand {
                user_id: user_id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(result.checked, 2);
        assert_eq!(result.repaired, vec!["TXN1".to_string(), refund.transaction_id.clone()]);

        let written = fx.payments.find_by_entry(&user_id, &refund.id).await.unwrap().unwrap();
        assert_eq!(written.status, RecordStatus::Refunded);
        assert_eq!(written.amount, 500);
        assert_eq!(
            fx.canonical(&user_id, "TXN1").await.unwrap().status,
            RecordStatus::Refunded
        );
    }
}
