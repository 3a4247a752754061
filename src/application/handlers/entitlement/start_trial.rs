//! StartTrialHandler - Grants the one-time trial.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, Plan};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{Clock, EntitlementRepository};

use super::retry::{mutate_with_retry, Mutation};
use super::EntitlementPolicy;

/// Command to start the trial.
#[derive(Debug, Clone)]
pub struct StartTrialCommand {
    pub user_id: UserId,
}

/// Plan and end date of the new trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTrialResult {
    pub plan: Plan,
    pub trial_end_date: Timestamp,
}

/// Handler for starting trials.
pub struct StartTrialHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    clock: Arc<dyn Clock>,
    policy: EntitlementPolicy,
}

impl StartTrialHandler {
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

    pub async fn handle(&self, cmd: StartTrialCommand) -> Result<StartTrialResult, EntitlementError> {
        let now = self.clock.now();
        let (record, trial_end_date) = mutate_with_retry(
            self.entitlements.as_ref(),
            &cmd.user_id,
            self.policy.max_update_attempts,
            |record| {
                record
                    .start_trial(self.policy.trial_days, now)
                    .map(Mutation::Write)
            },
        )
        .await?;

        tracing::info!(user_id = %cmd.user_id, trial_end = %trial_end_date.as_datetime(), "Trial started");
        Ok(StartTrialResult {
            plan: record.plan,
            trial_end_date,
        })
    }
}
