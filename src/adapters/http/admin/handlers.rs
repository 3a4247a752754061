//! HTTP handlers for the admin console.
//!
//! Every handler takes `RequireAdmin`. Admin routes do not run the
//! expiration guard; list views read stored records as they are.

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;

use crate::application::handlers::entitlement::{
    ApproveCancellationCommand, ApprovePaymentCommand, EntitlementView,
    GetEntitlementStatisticsQuery, GetRevenueReportQuery, ListCancellationRequestsQuery,
    ListPaymentsQuery, ListPendingPaymentsQuery, ReconcileLedgerCommand,
    RejectCancellationCommand, RejectPaymentCommand,
};
use crate::domain::foundation::{PaymentEntryId, UserId};

use super::super::error::ApiError;
use super::super::middleware::RequireAdmin;
use super::super::state::AppState;
use super::dto::{
    AdjudicationResponse, ApprovePaymentRequest, RefundResponse, RejectCancellationBody,
    RejectPaymentRequest,
};

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|e| ApiError::bad_field("userId", e.to_string()))
}

fn parse_payment_id(raw: &str) -> Result<PaymentEntryId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_field("paymentId", format!("'{}' is not a payment id", raw)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/payments/pending
pub async fn list_pending_payments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let claims = state
        .list_pending_payments_handler()
        .handle(ListPendingPaymentsQuery)
        .await?;
    Ok(Json(claims))
}

/// GET /api/admin/payments
pub async fn list_payments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.list_payments_handler().handle(ListPaymentsQuery).await?;
    Ok(Json(records))
}

/// POST /api/admin/payments/approve
pub async fn approve_payment(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<ApprovePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ApprovePaymentCommand {
        user_id: parse_user_id(&request.user_id)?,
        entry_id: parse_payment_id(&request.payment_id)?,
        plan_type: request.plan_type,
    };
    tracing::debug!(admin = %admin.id, user_id = %cmd.user_id, "Approve requested");

    let result = state.approve_payment_handler().handle(cmd).await?;
    Ok(Json(AdjudicationResponse {
        payment: result.entry,
        applied: result.applied,
        entitlement: Some(EntitlementView::from(result.entitlement)),
        ledger: result.ledger,
    }))
}

/// POST /api/admin/payments/reject
pub async fn reject_payment(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<RejectPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = RejectPaymentCommand {
        user_id: parse_user_id(&request.user_id)?,
        entry_id: parse_payment_id(&request.payment_id)?,
    };
    tracing::debug!(admin = %admin.id, user_id = %cmd.user_id, "Reject requested");

    let result = state.reject_payment_handler().handle(cmd).await?;
    Ok(Json(AdjudicationResponse {
        payment: result.entry,
        applied: result.applied,
        entitlement: None,
        ledger: result.ledger,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Cancellations
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/cancellations
pub async fn list_cancellations(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let pending = state
        .list_cancellations_handler()
        .handle(ListCancellationRequestsQuery)
        .await?;
    Ok(Json(pending))
}

/// POST /api/admin/cancellations/:user_id/approve
pub async fn approve_cancellation(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .approve_cancellation_handler()
        .handle(ApproveCancellationCommand {
            user_id: parse_user_id(&user_id)?,
        })
        .await?;

    Ok(Json(RefundResponse {
        entitlement: EntitlementView::from(result.entitlement),
        refund: result.refund,
        ledger: result.ledger,
        refund_ledger: result.refund_ledger,
    }))
}

/// POST /api/admin/cancellations/:user_id/reject
pub async fn reject_cancellation(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<String>,
    body: Option<Json<RejectCancellationBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let note = body.and_then(|Json(b)| b.note);
    let request = state
        .reject_cancellation_handler()
        .handle(RejectCancellationCommand {
            user_id: parse_user_id(&user_id)?,
            note,
        })
        .await?;
    Ok(Json(request))
}

// ════════════════════════════════════════════════════════════════════════════════
// Reporting and remediation
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/revenue
pub async fn revenue(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.revenue_handler().handle(GetRevenueReportQuery).await?;
    Ok(Json(report))
}

/// GET /api/admin/stats
pub async fn statistics(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .statistics_handler()
        .handle(GetEntitlementStatisticsQuery)
        .await?;
    Ok(Json(stats))
}

/// POST /api/admin/ledger/:user_id/reconcile
pub async fn reconcile_ledger(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .reconcile_handler()
        .handle(ReconcileLedgerCommand {
            user_id: parse_user_id(&user_id)?,
        })
        .await?;
    Ok(Json(result))
}
