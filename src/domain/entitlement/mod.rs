//! Entitlement domain module.
//!
//! Decides whether a user holds Pro features and records the payment
//! claims and cancellation requests that change that.
//!
//! # Module Structure
//!
//! - `record` - UserEntitlement aggregate and the lazy expiration rules
//! - `plan` - Plan and PaidPlan
//! - `payment_entry` - Embedded payment entries and their status machine
//! - `cancellation` - Cancellation requests
//! - `statistics` - Stored-state counts for the admin dashboard
//! - `errors` - EntitlementError

mod cancellation;
mod errors;
mod payment_entry;
mod plan;
mod record;
mod statistics;

pub use cancellation::{CancellationRequest, CancellationStatus};
pub use errors::EntitlementError;
pub use payment_entry::{EmbeddedPaymentEntry, EntryStatus, EntryType};
pub use plan::{PaidPlan, Plan};
pub use record::{Adjudication, Enforcement, RefundOutcome, UserEntitlement};
pub use statistics::{EntitlementStatistics, PlanCounts};
