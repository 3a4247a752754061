//! Router for the caller's own entitlement.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{get_entitlement, request_cancellation, start_trial, submit_payment};

/// Routes mounted at `/api/entitlement`.
///
/// - `GET /` - Current entitlement after expiration enforcement
/// - `POST /trial` - Start the one-time trial
/// - `POST /payments` - Submit a manual payment claim
/// - `POST /cancellation` - Request cancellation and refund
pub fn entitlement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_entitlement))
        .route("/trial", post(start_trial))
        .route("/payments", post(submit_payment))
        .route("/cancellation", post(request_cancellation))
}
