//! Tunables shared by the entitlement handlers.

/// Durations and limits the handlers apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementPolicy {
    /// Length of the one-time trial.
    pub trial_days: i64,
    /// Length of a monthly plan from approval.
    pub subscription_days: i64,
    /// Read-modify-write attempts before giving up on a contended record.
    pub max_update_attempts: u32,
    /// Prefix of synthetic refund transaction ids.
    pub refund_prefix: String,
}

impl Default for EntitlementPolicy {
    fn default() -> Self {
        Self {
            trial_days: 30,
            subscription_days: 30,
            max_update_attempts: 3,
            refund_prefix: "REF-".to_string(),
        }
    }
}
