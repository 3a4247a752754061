//! Router for the admin console.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{
    approve_cancellation, approve_payment, list_cancellations, list_payments,
    list_pending_payments, reconcile_ledger, reject_cancellation, reject_payment, revenue,
    statistics,
};

/// Routes mounted at `/api/admin`. All require the admin claim.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments))
        .route("/payments/pending", get(list_pending_payments))
        .route("/payments/approve", post(approve_payment))
        .route("/payments/reject", post(reject_payment))
        .route("/cancellations", get(list_cancellations))
        .route("/cancellations/:user_id/approve", post(approve_cancellation))
        .route("/cancellations/:user_id/reject", post(reject_cancellation))
        .route("/revenue", get(revenue))
        .route("/stats", get(statistics))
        .route("/ledger/:user_id/reconcile", post(reconcile_ledger))
}
