//! HTTP adapter - axum REST API.
//!
//! - `/api/entitlement/*` - the caller's own entitlement
//! - `/api/admin/*` - adjudication, reporting and ledger remediation
//!
//! Every authenticated route runs the expiration guard for the caller,
//! admins included.

pub mod admin;
pub mod entitlement;
pub mod error;
pub mod middleware;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

/// Builds the full API router.
///
/// Layer order, outermost first: tracing, authentication, expiration guard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/entitlement", entitlement::entitlement_routes())
        .nest("/api/admin", admin::admin_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::expiration_guard,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.session_validator.clone(),
            middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
