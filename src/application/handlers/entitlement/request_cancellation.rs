//! RequestCancellationHandler - User asks to cancel and be refunded.

use std::sync::Arc;

use crate::domain::entitlement::{CancellationRequest, EntitlementError};
use crate::domain::foundation::UserId;
use crate::ports::{Clock, EntitlementRepository};

use super::retry::{mutate_with_retry, Mutation};
use super::EntitlementPolicy;

#[derive(Debug, Clone)]
pub struct RequestCancellationCommand {
    pub user_id: UserId,
    pub reason: String,
    pub refund_method: String,
    pub refund_account: String,
}

pub type RequestCancellationResult = CancellationRequest;

/// Handler for filing cancellation requests. No entitlement change.
pub struct RequestCancellationHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    clock: Arc<dyn Clock>,
    policy: EntitlementPolicy,
}

impl RequestCancellationHandler {
    pub fn new(
        entitlements: Arc<dyn EntitlementRepository>,
        clock: Arc<dyn Clock>,
        policy: EntitlementPolicy,
    ) -> Self {
        Self {
            entitlements,
            clock,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: RequestCancellationCommand,
    ) -> Result<RequestCancellationResult, EntitlementError> {
        let now = self.clock.now();
        let request =
            CancellationRequest::new(cmd.reason, cmd.refund_method, cmd.refund_account, now)?;

        mutate_with_retry(
            self.entitlements.as_ref(),
            &cmd.user_id,
            self.policy.max_update_attempts,
            |record| {
                record.request_cancellation(request.clone(), now)?;
                Ok(Mutation::Write(()))
            },
        )
        .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            refund_method = %request.refund_method,
            "Cancellation requested"
        );
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::entitlement::test_support::{start, Fixture};
    use crate::domain::entitlement::Plan;

    fn handler(fx: &Fixture) -> RequestCancellationHandler {
        RequestCancellationHandler::new(fx.entitlements.clone(), fx.clock.clone(), fx.policy.clone())
    }

    fn cmd(user_id: &UserId) -> RequestCancellationCommand {
        RequestCancellationCommand {
            user_id: user_id.clone(),
            reason: "I'm doing better".into(),
            refund_method: "bkash".into(),
            refund_account: "017XXXXXXX".into(),
        }
    }

    async fn trial_user(fx: &Fixture) -> UserId {
        let user_id = fx.register("u-1").await;
        let mut record = fx.record(&user_id).await;
        record.start_trial(30, start()).unwrap();
        fx.entitlements.put(record).await;
        user_id
    }

    #[tokio::test]
    async fn stores_pending_request_without_downgrading() {
        let fx = Fixture::new();
        let user_id = trial_user(&fx).await;

        let request = handler(&fx).handle(cmd(&user_id)).await.unwrap();
        assert!(request.is_pending());

        let stored = fx.record(&user_id).await;
        assert_eq!(stored.plan, Plan::ProTrial);
        assert_eq!(stored.cancellation_request, Some(request));
    }

    #[tokio::test]
    async fn free_user_has_no_active_plan() {
        let fx = Fixture::new();
        let user_id = fx.register("u-1").await;
        let err = handler(&fx).handle(cmd(&user_id)).await.unwrap_err();
        assert_eq!(err, EntitlementError::NoActivePlan);
    }

    #[tokio::test]
    async fn second_request_is_refused() {
        let fx = Fixture::new();
        let user_id = trial_user(&fx).await;
        handler(&fx).handle(cmd(&user_id)).await.unwrap();
        let err = handler(&fx).handle(cmd(&user_id)).await.unwrap_err();
        assert_eq!(err, EntitlementError::RequestAlreadyPending);
    }

    #[tokio::test]
    async fn blank_refund_account_is_rejected() {
        let fx = Fixture::new();
        let user_id = trial_user(&fx).await;
        let mut bad = cmd(&user_id);
        bad.refund_account = " ".into();
        let err = handler(&fx).handle(bad).await.unwrap_err();
        assert!(matches!(err, EntitlementError::Validation { .. }));
    }
}
