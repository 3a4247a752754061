//! Plan levels a user can hold.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entitlement plan stored on the user record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    /// No paid features. Every record starts here.
    #[default]
    Free,

    /// One-time promotional grant, bounded by `trial_end_date`.
    ProTrial,

    /// Paid plan bounded by `subscription_end_date`.
    ProMonthly,

    /// Paid plan that never lapses.
    ProLifetime,
}

impl Plan {
    /// Returns true for every plan except `Free`.
    pub fn is_paid_or_trial(&self) -> bool {
        !matches!(self, Plan::Free)
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::ProTrial => "PRO_TRIAL",
            Plan::ProMonthly => "PRO_MONTHLY",
            Plan::ProLifetime => "PRO_LIFETIME",
        }
    }

    /// Inverse of [`Plan::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FREE" => Some(Plan::Free),
            "PRO_TRIAL" => Some(Plan::ProTrial),
            "PRO_MONTHLY" => Some(Plan::ProMonthly),
            "PRO_LIFETIME" => Some(Plan::ProLifetime),
            _ => None,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plans that can be bought through a payment claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaidPlan {
    ProMonthly,
    ProLifetime,
}

impl PaidPlan {
    /// Whether the plan carries a `subscription_end_date`.
    pub fn is_time_boxed(&self) -> bool {
        matches!(self, PaidPlan::ProMonthly)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match Plan::parse(s)? {
            Plan::ProMonthly => Some(PaidPlan::ProMonthly),
            Plan::ProLifetime => Some(PaidPlan::ProLifetime),
            Plan::Free | Plan::ProTrial => None,
        }
    }
}

impl From<PaidPlan> for Plan {
    fn from(plan: PaidPlan) -> Self {
        match plan {
            PaidPlan::ProMonthly => Plan::ProMonthly,
            PaidPlan::ProLifetime => Plan::ProLifetime,
        }
    }
}

impl fmt::Display for PaidPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Plan::from(*self).fmt(f)
    }
}
