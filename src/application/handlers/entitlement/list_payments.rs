//! ListPaymentsHandler - Every canonical payment record, newest first.

use std::sync::Arc;

use crate::domain::entitlement::EntitlementError;
use crate::domain::ledger::PaymentRecord;
use crate::ports::PaymentRecordRepository;

#[derive(Debug, Clone, Default)]
pub struct ListPaymentsQuery;

pub type ListPaymentsResult = Vec<PaymentRecord>;

pub struct ListPaymentsHandler {
    payments: Arc<dyn PaymentRecordRepository>,
}

impl ListPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRecordRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(
        &self,
        _query: ListPaymentsQuery,
    ) -> Result<ListPaymentsResult, EntitlementError> {
        Ok(self.payments.list_all().await?)
    }
}
