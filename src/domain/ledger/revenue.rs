//! Revenue analytics over completed canonical records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Timestamp;

use super::{PaymentRecord, RecordStatus};

/// Revenue totals and calendar buckets (UTC).
///
/// Bucket keys are `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total: i64,
    pub today: i64,
    pub this_month: i64,
    pub this_year: i64,
    pub completed_payments: u64,
    pub daily: BTreeMap<String, i64>,
    pub monthly: BTreeMap<String, i64>,
    pub yearly: BTreeMap<String, i64>,
}

impl RevenueReport {
    /// Sums every `Completed` record. Other statuses are ignored.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a PaymentRecord>,
        now: Timestamp,
    ) -> Self {
        let (today, month, year) = (now.day_key(), now.month_key(), now.year_key());
        let mut report = Self::default();

        for record in records
            .into_iter()
            .filter(|r| r.status == RecordStatus::Completed)
        {
            let day_key = record.date.day_key();
            let month_key = record.date.month_key();
            let year_key = record.date.year_key();

            report.total += record.amount;
            report.completed_payments += 1;
            if day_key == today {
                report.today += record.amount;
            }
            if month_key == month {
                report.this_month += record.amount;
            }
            if year_key == year {
                report.this_year += record.amount;
            }

            *report.daily.entry(day_key).or_insert(0) += record.amount;
            *report.monthly.entry(month_key).or_insert(0) += record.amount;
            *report.yearly.entry(year_key).or_insert(0) += record.amount;
        }

        report
    }
}
