//! Expiration guard for authenticated routes.
//!
//! Runs the lazy expiration check for the caller before the handler sees
//! the request. A caller without a record gets one at plan FREE, built
//! from the token claims.
//!
//! The guard never blocks a request: if the check cannot complete it logs
//! and lets the request through, and the handler works from whatever it
//! reads itself.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::application::handlers::entitlement::{
    EnforceExpirationCommand, EnforceExpirationResult, RegisterEntitlementCommand,
};
use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::AuthenticatedUser;

use super::super::state::AppState;

pub async fn expiration_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(user) = request.extensions().get::<AuthenticatedUser>().cloned() {
        match enforce_or_register(&state, &user).await {
            Ok(result) if !result.persisted => {
                tracing::warn!(
                    user_id = %user.id,
                    "Proceeding with unpersisted expiration state"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Expiration check failed, proceeding");
            }
        }
    }
    next.run(request).await
}

async fn enforce_or_register(
    state: &AppState,
    user: &AuthenticatedUser,
) -> Result<EnforceExpirationResult, EntitlementError> {
    match enforce(state, user).await {
        Err(EntitlementError::UserNotFound(_)) => {
            let registered = state
                .register_handler()
                .handle(RegisterEntitlementCommand {
                    user_id: user.id.clone(),
                    user_name: user.display_name_or_email().to_string(),
                    user_email: user.email.clone(),
                })
                .await;
            match registered {
                Ok(_) | Err(EntitlementError::AlreadyExists(_)) => enforce(state, user).await,
                Err(e) => Err(e),
            }
        }
        other => other,
    }
}

async fn enforce(
    state: &AppState,
    user: &AuthenticatedUser,
) -> Result<EnforceExpirationResult, EntitlementError> {
    state
        .enforce_handler()
        .handle(EnforceExpirationCommand {
            user_id: user.id.clone(),
        })
        .await
}
