//! Ledger domain module.
//!
//! The canonical payment collection: records, their statuses, how a sync
//! with the embedded history turned out, and revenue analytics.

mod payment_record;
mod revenue;
mod sync;

pub use payment_record::{PaymentRecord, RecordStatus};
pub use revenue::RevenueReport;
pub use sync::LedgerSync;
