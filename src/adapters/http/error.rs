//! Error responses for the HTTP adapter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::ErrorCode;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts entitlement errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub EntitlementError);

impl From<EntitlementError> for ApiError {
    fn from(err: EntitlementError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// A 400 for request fields that fail to parse.
    pub fn bad_field(field: &str, message: impl Into<String>) -> Self {
        Self(EntitlementError::validation(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EntitlementError::UserNotFound(_)
            | EntitlementError::EntryNotFound(_)
            | EntitlementError::NoRequestPending => StatusCode::NOT_FOUND,
            EntitlementError::AlreadyExists(_)
            | EntitlementError::AlreadySubscribed { .. }
            | EntitlementError::TrialAlreadyUsed
            | EntitlementError::RequestAlreadyPending
            | EntitlementError::InvalidState { .. }
            | EntitlementError::Conflict(_) => StatusCode::CONFLICT,
            EntitlementError::NoActivePlan | EntitlementError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            EntitlementError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
            ErrorResponse::new(ErrorCode::InternalError.to_string(), "Internal server error")
        } else {
            ErrorResponse::new(self.0.code().to_string(), self.0.message())
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::Plan;
    use crate::domain::foundation::UserId;

    #[test]
    fn user_errors_map_to_client_statuses() {
        let user = UserId::new("u-1").unwrap();
        assert_eq!(
            ApiError(EntitlementError::UserNotFound(user.clone())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError(EntitlementError::NoRequestPending).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(EntitlementError::TrialAlreadyUsed).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError(EntitlementError::AlreadySubscribed {
                plan: Plan::ProLifetime
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError(EntitlementError::NoActivePlan).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::bad_field("amount", "must be positive").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let err = ApiError(EntitlementError::infrastructure("db down"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_response_serializes_code_and_message() {
        let json = serde_json::to_value(ErrorResponse::new("TRIAL_ALREADY_USED", "used")).unwrap();
        assert_eq!(json["code"], "TRIAL_ALREADY_USED");
        assert_eq!(json["message"], "used");
    }
}
