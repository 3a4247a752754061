//! Request and response bodies for the admin endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::entitlement::EntitlementView;
use crate::domain::entitlement::{EmbeddedPaymentEntry, PaidPlan};
use crate::domain::ledger::LedgerSync;

/// `POST /api/admin/payments/approve`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePaymentRequest {
    pub user_id: String,
    pub payment_id: String,
    pub plan_type: PaidPlan,
}

/// `POST /api/admin/payments/reject`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectPaymentRequest {
    pub user_id: String,
    pub payment_id: String,
}

/// `POST /api/admin/cancellations/:user_id/reject`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectCancellationBody {
    #[serde(default)]
    pub note: Option<String>,
}

/// Outcome of an approve or reject decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjudicationResponse {
    pub payment: EmbeddedPaymentEntry,
    /// False if the payment had already been decided.
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitlement: Option<EntitlementView>,
    pub ledger: LedgerSync,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub entitlement: EntitlementView,
    pub refund: EmbeddedPaymentEntry,
    pub ledger: Option<LedgerSync>,
    pub refund_ledger: LedgerSync,
}
