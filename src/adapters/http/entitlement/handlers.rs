//! HTTP handlers for the caller's own entitlement.
//!
//! Every route here sits behind the expiration guard.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::entitlement::{
    EntitlementView, GetEntitlementQuery, RequestCancellationCommand, StartTrialCommand,
    SubmitPaymentCommand,
};

use super::super::error::ApiError;
use super::super::middleware::RequireAuth;
use super::super::state::AppState;
use super::dto::{
    CancellationRequestBody, PaymentSubmittedResponse, SubmitPaymentRequest, TrialStartedResponse,
};

/// GET /api/entitlement
pub async fn get_entitlement(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<EntitlementView>, ApiError> {
    let view = state
        .get_entitlement_handler()
        .handle(GetEntitlementQuery { user_id: user.id })
        .await?;
    Ok(Json(view))
}

/// POST /api/entitlement/trial
pub async fn start_trial(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .start_trial_handler()
        .handle(StartTrialCommand { user_id: user.id })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TrialStartedResponse {
            plan: result.plan,
            trial_end_date: result.trial_end_date,
        }),
    ))
}

/// POST /api/entitlement/payments
pub async fn submit_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<SubmitPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .submit_payment_handler()
        .handle(SubmitPaymentCommand {
            user_id: user.id,
            transaction_id: request.transaction_id,
            method: request.method,
            amount: request.amount,
            plan_type: request.plan_type,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentSubmittedResponse {
            payment: result.entry,
        }),
    ))
}

/// POST /api/entitlement/cancellation
pub async fn request_cancellation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CancellationRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state
        .request_cancellation_handler()
        .handle(RequestCancellationCommand {
            user_id: user.id,
            reason: body.reason,
            refund_method: body.refund_method,
            refund_account: body.refund_account,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}
