//! ListPendingPaymentsHandler - Admin queue of claims awaiting review.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::{EmbeddedPaymentEntry, EntitlementError};
use crate::domain::foundation::UserId;
use crate::ports::EntitlementRepository;

#[derive(Debug, Clone, Default)]
pub struct ListPendingPaymentsQuery;

/// A claim awaiting adjudication, with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingClaim {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub entry: EmbeddedPaymentEntry,
}

pub type ListPendingPaymentsResult = Vec<PendingClaim>;

/// Handler listing pending claims, oldest first.
pub struct ListPendingPaymentsHandler {
    entitlements: Arc<dyn EntitlementRepository>,
}

impl ListPendingPaymentsHandler {
    pub fn new(entitlements: Arc<dyn EntitlementRepository>) -> Self {
        Self { entitlements }
    }

    pub async fn handle(
        &self,
        _query: ListPendingPaymentsQuery,
    ) -> Result<ListPendingPaymentsResult, EntitlementError> {
        let records = self.entitlements.list_with_pending_payments().await?;

        let mut claims: Vec<PendingClaim> = records
            .iter()
            .flat_map(|record| {
                record.pending_entries().map(move |entry| PendingClaim {
                    user_id: record.user_id.clone(),
                    user_name: record.user_name.clone(),
                    user_email: record.user_email.clone(),
                    entry: entry.clone(),
                })
            })
            .collect();
        claims.sort_by(|a, b| a.entry.date.cmp(&b.entry.date));
        Ok(claims)
    }
}
