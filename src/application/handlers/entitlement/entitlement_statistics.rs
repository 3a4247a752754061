//! GetEntitlementStatisticsHandler - Admin dashboard numbers.
//!
//! Reads stored records as-is. Expiration is not enforced here, so users
//! whose plan lapsed without a later request still count as Pro.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::{EntitlementError, EntitlementStatistics};
use crate::domain::ledger::RevenueReport;
use crate::ports::{Clock, EntitlementRepository, PaymentRecordRepository};

#[derive(Debug, Clone, Default)]
pub struct GetEntitlementStatisticsQuery;

/// User counts plus headline revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntitlementStatisticsResult {
    #[serde(flatten)]
    pub users: EntitlementStatistics,
    pub total_revenue: i64,
    pub monthly_revenue: i64,
}

pub struct GetEntitlementStatisticsHandler {
    entitlements: Arc<dyn EntitlementRepository>,
    payments: Arc<dyn PaymentRecordRepository>,
    clock: Arc<dyn Clock>,
}

impl GetEntitlementStatisticsHandler {
    pub fn new(
        entitlements: Arc<dyn EntitlementRepository>,
        payments: Arc<dyn PaymentRecordRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entitlements,
            payments,
            clock,
        }
    }

    pub async fn handle(
        &self,
        _query: GetEntitlementStatisticsQuery,
    ) -> Result<GetEntitlementStatisticsResult, EntitlementError> {
        let records = self.entitlements.list_all().await?;
        let payments = self.payments.list_all().await?;
        let revenue = RevenueReport::from_records(&payments, self.clock.now());

        Ok(GetEntitlementStatisticsResult {
            users: EntitlementStatistics::from_records(&records),
            total_revenue: revenue.total,
            monthly_revenue: revenue.this_month,
        })
    }
}
