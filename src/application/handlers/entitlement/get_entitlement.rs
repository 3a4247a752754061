//! GetEntitlementHandler - Current entitlement as the user should see it.

use serde::Serialize;

use crate::domain::entitlement::{
    CancellationRequest, EmbeddedPaymentEntry, EntitlementError, Plan, UserEntitlement,
};
use crate::domain::foundation::{Timestamp, UserId};

use super::{EnforceExpirationCommand, EnforceExpirationHandler};

/// Query for one user's entitlement.
#[derive(Debug, Clone)]
pub struct GetEntitlementQuery {
    pub user_id: UserId,
}

/// Read model returned to the owner of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementView {
    pub user_id: UserId,
    pub plan: Plan,
    pub is_pro: bool,
    pub trial_start_date: Option<Timestamp>,
    pub trial_end_date: Option<Timestamp>,
    pub trial_available: bool,
    pub subscription_end_date: Option<Timestamp>,
    pub payment_history: Vec<EmbeddedPaymentEntry>,
    pub cancellation_request: Option<CancellationRequest>,
}

impl From<UserEntitlement> for EntitlementView {
    fn from(record: UserEntitlement) -> Self {
        let trial_available = record.plan == Plan::Free
            && record.trial_redeemed_at.is_none()
            && record.trial_start_date.is_none();
        Self {
            user_id: record.user_id,
            plan: record.plan,
            is_pro: record.is_pro,
            trial_start_date: record.trial_start_date,
            trial_end_date: record.trial_end_date,
            trial_available,
            subscription_end_date: record.subscription_end_date,
            payment_history: record.payment_history,
            cancellation_request: record.cancellation_request,
        }
    }
}

pub type GetEntitlementResult = EntitlementView;

/// Handler that enforces expiration, then returns the view.
pub struct GetEntitlementHandler {
    enforcer: EnforceExpirationHandler,
}

impl GetEntitlementHandler {
    pub fn new(enforcer: EnforceExpirationHandler) -> Self {
        Self { enforcer }
    }

    pub async fn handle(
        &self,
        query: GetEntitlementQuery,
    ) -> Result<GetEntitlementResult, EntitlementError> {
        let enforced = self
            .enforcer
            .handle(EnforceExpirationCommand {
                user_id: query.user_id,
            })
            .await?;
        Ok(enforced.entitlement.into())
    }
}
