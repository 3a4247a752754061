//! RejectCancellationHandler - Admin declines a refund request.
//!
//! The request stays on the record as `rejected` so the user can see the
//! decision; a new request may be filed afterwards.

use std::sync::Arc;

use crate::domain::entitlement::{CancellationRequest, EntitlementError};
use crate::domain::foundation::UserId;
use crate::ports::{Clock, EntitlementRepository};

use super::retry::{mutate_with_retry, Mutation};
use super::EntitlementPolicy;

#[derive(Debug, Clone)]
pub struct RejectCancellationCommand {
    pub user_id: UserId,
    pub note: Option<String>,
}

pub type RejectCancellationResult = CancellationRequest;

pub struct RejectCancellationHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    clock: Arc<dyn Clock>,
    policy: EntitlementPolicy,
}

impl RejectCancellationHandler {
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
        cmd: RejectCancellationCommand,
    ) -> Result<RejectCancellationResult, EntitlementError> {
        let now = self.clock.now();
        let (_, request) = mutate_with_retry(
            self.entitlements.as_ref(),
            &cmd.user_id,
            self.policy.max_update_attempts,
            |record| {
                record
                    .reject_cancellation(cmd.note.clone(), now)
                    .map(Mutation::Write)
            },
        )
        .await?;

        tracing::info!(user_id = %cmd.user_id, "Cancellation request rejected");
        Ok(request)
    }
}
