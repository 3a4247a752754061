//! GetRevenueReportHandler - Revenue analytics for the admin console.

use std::sync::Arc;

use crate::domain::entitlement::EntitlementError;
use crate::domain::ledger::RevenueReport;
use crate::ports::{Clock, PaymentRecordRepository};

#[derive(Debug, Clone, Default)]
pub struct GetRevenueReportQuery;

pub type GetRevenueReportResult = RevenueReport;

pub struct GetRevenueReportHandler {
    payments: Arc<dyn PaymentRecordRepository>,
    clock: Arc<dyn Clock>,
}

impl GetRevenueReportHandler {
    pub fn new(payments: Arc<dyn PaymentRecordRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { payments, clock }
    }

    pub async fn handle(
        &self,
        _query: GetRevenueReportQuery,
    ) -> Result<GetRevenueReportResult, EntitlementError> {
        let records = self.payments.list_all().await?;
        Ok(RevenueReport::from_records(&records, self.clock.now()))
    }
}
