//! Aggregate counts over stored entitlement records.
//!
//! Computed from the records as stored, without running the expiration
//! check. Users who lapsed but have not made a request since still count
//! as Pro here.

use serde::{Deserialize, Serialize};

use super::{Plan, UserEntitlement};

/// Count of records by plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCounts {
    pub free: u64,
    pub pro_trial: u64,
    pub pro_monthly: u64,
    pub pro_lifetime: u64,
}

/// Admin dashboard statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementStatistics {
    pub total_users: u64,
    /// Records whose stored `is_pro` flag is set.
    pub pro_users: u64,
    pub free_users: u64,
    pub by_plan: PlanCounts,
    pub pending_payments: u64,
    pub pending_cancellations: u64,
}

impl EntitlementStatistics {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a UserEntitlement>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total_users += 1;
            if record.is_pro {
                stats.pro_users += 1;
            } else {
                stats.free_users += 1;
            }
            match record.plan {
                Plan::Free => stats.by_plan.free += 1,
                Plan::ProTrial => stats.by_plan.pro_trial += 1,
                Plan::ProMonthly => stats.by_plan.pro_monthly += 1,
                Plan::ProLifetime => stats.by_plan.pro_lifetime += 1,
            }
            stats.pending_payments += record.pending_entries().map(|_| 1u64).sum::<u64>();
            if record.has_pending_cancellation() {
                stats.pending_cancellations += 1;
            }
        }
        stats
    }
}
