//! Entitlement handlers.
//!
//! User-facing operations (trial, payment claims, cancellation requests)
//! and the admin operations that adjudicate them. Every write to an
//! entitlement record goes through optimistic versioning with a bounded
//! retry; writes to the canonical ledger are best-effort and reported.

mod approve_cancellation;
mod approve_payment;
mod enforce_expiration;
mod entitlement_statistics;
mod get_entitlement;
mod ledger_sync;
mod list_cancellations;
mod list_payments;
mod list_pending_payments;
mod policy;
mod reconcile_ledger;
mod register_entitlement;
mod reject_cancellation;
mod reject_payment;
mod request_cancellation;
mod retry;
mod revenue_report;
mod start_trial;
mod submit_payment;

#[cfg(test)]
pub(crate) mod test_support;

pub use approve_cancellation::{
    ApproveCancellationCommand, ApproveCancellationHandler, ApproveCancellationResult,
};
pub use approve_payment::{ApprovePaymentCommand, ApprovePaymentHandler, ApprovePaymentResult};
pub use enforce_expiration::{
    EnforceExpirationCommand, EnforceExpirationHandler, EnforceExpirationResult,
};
pub use entitlement_statistics::{
    GetEntitlementStatisticsHandler, GetEntitlementStatisticsQuery, GetEntitlementStatisticsResult,
};
pub use get_entitlement::{
    EntitlementView, GetEntitlementHandler, GetEntitlementQuery, GetEntitlementResult,
};
pub use list_cancellations::{
    ListCancellationRequestsHandler, ListCancellationRequestsQuery,
    ListCancellationRequestsResult, PendingCancellation,
};
pub use list_payments::{ListPaymentsHandler, ListPaymentsQuery, ListPaymentsResult};
pub use list_pending_payments::{
    ListPendingPaymentsHandler, ListPendingPaymentsQuery, ListPendingPaymentsResult, PendingClaim,
};
pub use policy::EntitlementPolicy;
pub use reconcile_ledger::{ReconcileLedgerCommand, ReconcileLedgerHandler, ReconcileLedgerResult};
pub use register_entitlement::{
    RegisterEntitlementCommand, RegisterEntitlementHandler, RegisterEntitlementResult,
};
pub use reject_cancellation::{
    RejectCancellationCommand, RejectCancellationHandler, RejectCancellationResult,
};
pub use reject_payment::{RejectPaymentCommand, RejectPaymentHandler, RejectPaymentResult};
pub use request_cancellation::{
    RequestCancellationCommand, RequestCancellationHandler, RequestCancellationResult,
};
pub use revenue_report::{GetRevenueReportHandler, GetRevenueReportQuery, GetRevenueReportResult};
pub use start_trial::{StartTrialCommand, StartTrialHandler, StartTrialResult};
pub use submit_payment::{SubmitPaymentCommand, SubmitPaymentHandler, SubmitPaymentResult};
