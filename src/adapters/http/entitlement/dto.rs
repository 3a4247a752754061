//! Request and response bodies for the user entitlement endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::entitlement::{EmbeddedPaymentEntry, PaidPlan, Plan};
use crate::domain::foundation::Timestamp;

/// `POST /api/entitlement/payments`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentRequest {
    pub transaction_id: String,
    pub method: String,
    pub amount: i64,
    pub plan_type: PaidPlan,
}

/// `POST /api/entitlement/cancellation`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequestBody {
    #[serde(default)]
    pub reason: String,
    pub refund_method: String,
    pub refund_account: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialStartedResponse {
    pub plan: Plan,
    pub trial_end_date: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmittedResponse {
    pub payment: EmbeddedPaymentEntry,
}
