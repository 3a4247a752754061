//! RegisterEntitlementHandler - Creates the FREE record for a new user.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, UserEntitlement};
use crate::domain::foundation::{ErrorCode, UserId};
use crate::ports::{Clock, EntitlementRepository};

/// Command to create a user's entitlement record.
#[derive(Debug, Clone)]
pub struct RegisterEntitlementCommand {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
}

pub type RegisterEntitlementResult = UserEntitlement;

/// Handler for registering entitlement records.
pub struct RegisterEntitlementHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    clock: Arc<dyn Clock>,
}

impl RegisterEntitlementHandler {
    pub fn new(entitlements: Arc<dyn EntitlementRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entitlements,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: RegisterEntitlementCommand,
    ) -> Result<RegisterEntitlementResult, EntitlementError> {
        let record = UserEntitlement::register(
            cmd.user_id.clone(),
            cmd.user_name,
            cmd.user_email,
            self.clock.now(),
        );

        match self.entitlements.create(&record).await {
            Ok(()) => {
                tracing::info!(user_id = %cmd.user_id, "Entitlement registered");
                Ok(record)
            }
            Err(e) if e.code == ErrorCode::AlreadyExists => {
                Err(EntitlementError::AlreadyExists(cmd.user_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
