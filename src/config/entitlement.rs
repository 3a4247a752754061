//! Entitlement policy configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::handlers::entitlement::EntitlementPolicy;

/// Tunables for the entitlement lifecycle.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementConfig {
    #[serde(default = "default_trial_days")]
    pub trial_days: i64,

    #[serde(default = "default_subscription_days")]
    pub subscription_days: i64,

    /// Attempts per read-modify-write before giving up on a conflict
    #[serde(default = "default_max_update_attempts")]
    pub max_update_attempts: u32,

    /// Prefix of generated refund transaction ids
    #[serde(default = "default_refund_prefix")]
    pub refund_prefix: String,
}

impl EntitlementConfig {
    pub fn policy(&self) -> EntitlementPolicy {
        EntitlementPolicy {
            trial_days: self.trial_days,
            subscription_days: self.subscription_days,
            max_update_attempts: self.max_update_attempts,
            refund_prefix: self.refund_prefix.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=3650).contains(&self.trial_days) {
            return Err(ValidationError::OutOfRange {
                field: "trial_days",
                max: 3650,
            });
        }
        if !(1..=3650).contains(&self.subscription_days) {
            return Err(ValidationError::OutOfRange {
                field: "subscription_days",
                max: 3650,
            });
        }
        if !(1..=20).contains(&self.max_update_attempts) {
            return Err(ValidationError::OutOfRange {
                field: "max_update_attempts",
                max: 20,
            });
        }
        if self.refund_prefix.trim().is_empty() {
            return Err(ValidationError::EmptyRefundPrefix);
        }
        Ok(())
    }
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            trial_days: default_trial_days(),
            subscription_days: default_subscription_days(),
            max_update_attempts: default_max_update_attempts(),
            refund_prefix: default_refund_prefix(),
        }
    }
}

fn default_trial_days() -> i64 {
    30
}

fn default_subscription_days() -> i64 {
    30
}

fn default_max_update_attempts() -> u32 {
    3
}

fn default_refund_prefix() -> String {
    "REF-".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy_defaults() {
        let policy = EntitlementConfig::default().policy();
        let expected = EntitlementPolicy::default();
        assert_eq!(policy.trial_days, expected.trial_days);
        assert_eq!(policy.subscription_days, expected.subscription_days);
        assert_eq!(policy.max_update_attempts, expected.max_update_attempts);
        assert_eq!(policy.refund_prefix, expected.refund_prefix);
    }

    #[test]
    fn test_out_of_range_values_fail() {
        let config = EntitlementConfig {
            trial_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EntitlementConfig {
            max_update_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EntitlementConfig {
            refund_prefix: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyRefundPrefix));
    }
}
