//! ListCancellationRequestsHandler - Admin queue of pending refund requests.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::{CancellationRequest, EntitlementError, Plan};
use crate::domain::foundation::UserId;
use crate::ports::EntitlementRepository;

#[derive(Debug, Clone, Default)]
pub struct ListCancellationRequestsQuery;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCancellation {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub plan: Plan,
    pub request: CancellationRequest,
}

pub type ListCancellationRequestsResult = Vec<PendingCancellation>;

pub struct ListCancellationRequestsHandler {
    entitlements: Arc<dyn EntitlementRepository>,
}

impl ListCancellationRequestsHandler {
    pub fn new(entitlements: Arc<dyn EntitlementRepository>) -> Self {
        Self { entitlements }
    }

    pub async fn handle(
        &self,
        _query: ListCancellationRequestsQuery,
    ) -> Result<ListCancellationRequestsResult, EntitlementError> {
        let mut pending: Vec<PendingCancellation> = self
            .entitlements
            .list_with_pending_cancellations()
            .await?
            .into_iter()
            .filter_map(|record| {
                let request = record.cancellation_request.filter(|r| r.is_pending())?;
                Some(PendingCancellation {
                    user_id: record.user_id,
                    user_name: record.user_name,
                    user_email: record.user_email,
                    plan: record.plan,
                    request,
                })
            })
            .collect();
        pending.sort_by(|a, b| a.request.requested_at.cmp(&b.request.requested_at));
        Ok(pending)
    }
}
