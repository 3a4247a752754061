//! Shared application state for the HTTP adapter.

use std::sync::Arc;

use crate::application::handlers::entitlement::{
    ApproveCancellationHandler, ApprovePaymentHandler, EnforceExpirationHandler,
    EntitlementPolicy, GetEntitlementHandler, GetEntitlementStatisticsHandler,
    GetRevenueReportHandler, ListCancellationRequestsHandler, ListPaymentsHandler,
    ListPendingPaymentsHandler, ReconcileLedgerHandler, RegisterEntitlementHandler,
    RejectCancellationHandler, RejectPaymentHandler, RequestCancellationHandler,
    StartTrialHandler, SubmitPaymentHandler,
};
use crate::ports::{Clock, EntitlementRepository, PaymentRecordRepository, SessionValidator};

/// Dependencies shared by every request.
///
/// Cloned per request; handlers are built on demand from the Arcs.
#[derive(Clone)]
pub struct AppState {
    pub entitlements: Arc<dyn EntitlementRepository>,
    pub payments: Arc<dyn PaymentRecordRepository>,
    pub clock: Arc<dyn Clock>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub policy: EntitlementPolicy,
}

impl AppState {
    pub fn register_handler(&self) -> RegisterEntitlementHandler {
        RegisterEntitlementHandler::new(self.entitlements.clone(), self.clock.clone())
    }

    pub fn enforce_handler(&self) -> EnforceExpirationHandler {
        EnforceExpirationHandler::new(
            self.entitlements.clone(),
            self.clock.clone(),
            self.policy.max_update_attempts,
        )
    }

    pub fn get_entitlement_handler(&self) -> GetEntitlementHandler {
        GetEntitlementHandler::new(self.enforce_handler())
    }

    pub fn start_trial_handler(&self) -> StartTrialHandler {
        StartTrialHandler::new(
            self.entitlements.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn submit_payment_handler(&self) -> SubmitPaymentHandler {
        SubmitPaymentHandler::new(
            self.entitlements.clone(),
            self.payments.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn request_cancellation_handler(&self) -> RequestCancellationHandler {
        RequestCancellationHandler::new(
            self.entitlements.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn list_pending_payments_handler(&self) -> ListPendingPaymentsHandler {
        ListPendingPaymentsHandler::new(self.entitlements.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.payments.clone())
    }

    pub fn approve_payment_handler(&self) -> ApprovePaymentHandler {
        ApprovePaymentHandler::new(
            self.entitlements.clone(),
            self.payments.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn reject_payment_handler(&self) -> RejectPaymentHandler {
        RejectPaymentHandler::new(
            self.entitlements.clone(),
            self.payments.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn list_cancellations_handler(&self) -> ListCancellationRequestsHandler {
        ListCancellationRequestsHandler::new(self.entitlements.clone())
    }

    pub fn approve_cancellation_handler(&self) -> ApproveCancellationHandler {
        ApproveCancellationHandler::new(
            self.entitlements.clone(),
            self.payments.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn reject_cancellation_handler(&self) -> RejectCancellationHandler {
        RejectCancellationHandler::new(
            self.entitlements.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn revenue_handler(&self) -> GetRevenueReportHandler {
        GetRevenueReportHandler::new(self.payments.clone(), self.clock.clone())
    }

    pub fn statistics_handler(&self) -> GetEntitlementStatisticsHandler {
        GetEntitlementStatisticsHandler::new(
            self.entitlements.clone(),
            self.payments.clone(),
            self.clock.clone(),
        )
    }

    pub fn reconcile_handler(&self) -> ReconcileLedgerHandler {
        ReconcileLedgerHandler::new(
            self.entitlements.clone(),
            self.payments.clone(),
            self.clock.clone(),
        )
    }
}
