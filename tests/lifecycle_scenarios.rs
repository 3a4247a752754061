//! End-to-end lifecycle scenarios driven through the application handlers
//! against in-memory storage and a manually advanced clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use pro_entitlements::adapters::{
    FixedClock, InMemoryEntitlementRepository, InMemoryPaymentRecordRepository,
    MockSessionValidator,
};
use pro_entitlements::adapters::http::AppState;
use pro_entitlements::application::{
    ApproveCancellationCommand, ApprovePaymentCommand, ApprovePaymentResult, EntitlementPolicy,
    EntitlementView, GetEntitlementQuery, ListPendingPaymentsQuery, ReconcileLedgerCommand,
    RegisterEntitlementCommand, RejectPaymentCommand, RequestCancellationCommand,
    StartTrialCommand, SubmitPaymentCommand,
};
use pro_entitlements::domain::entitlement::{
    EntitlementError, EntryStatus, EntryType, PaidPlan, Plan,
};
use pro_entitlements::domain::foundation::{PaymentEntryId, Timestamp, UserId};
use pro_entitlements::domain::ledger::{LedgerSync, RecordStatus};
use pro_entitlements::ports::{EntitlementRepository, PaymentRecordRepository};

fn day_zero() -> Timestamp {
    let dt = DateTime::parse_from_rfc3339("2024-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    Timestamp::from_datetime(dt)
}

struct World {
    entitlements: Arc<InMemoryEntitlementRepository>,
    payments: Arc<InMemoryPaymentRecordRepository>,
    clock: Arc<FixedClock>,
    state: AppState,
}

impl World {
    fn new() -> Self {
        let entitlements = Arc::new(InMemoryEntitlementRepository::new());
        let payments = Arc::new(InMemoryPaymentRecordRepository::new());
        let clock = Arc::new(FixedClock::at(day_zero()));
        let state = AppState {
            entitlements: entitlements.clone(),
            payments: payments.clone(),
            clock: clock.clone(),
            session_validator: Arc::new(MockSessionValidator::new()),
            policy: EntitlementPolicy::default(),
        };
        Self {
            entitlements,
            payments,
            clock,
            state,
        }
    }

    async fn register(&self, id: &str) -> UserId {
        let user_id = UserId::new(id).unwrap();
        self.state
            .register_handler()
            .handle(RegisterEntitlementCommand {
                user_id: user_id.clone(),
                user_name: format!("User {id}"),
                user_email: format!("{id}@example.com"),
            })
            .await
            .unwrap();
        user_id
    }

    async fn submit(&self, user_id: &UserId, txn: &str, amount: i64) -> PaymentEntryId {
        self.state
            .submit_payment_handler()
            .handle(SubmitPaymentCommand {
                user_id: user_id.clone(),
                transaction_id: txn.to_string(),
                method: "bkash".to_string(),
                amount,
                plan_type: PaidPlan::ProMonthly,
            })
            .await
            .unwrap()
            .entry
            .id
    }

    async fn approve(
        &self,
        user_id: &UserId,
        entry_id: PaymentEntryId,
        plan: PaidPlan,
    ) -> ApprovePaymentResult {
        self.state
            .approve_payment_handler()
            .handle(ApprovePaymentCommand {
                user_id: user_id.clone(),
                entry_id,
                plan_type: plan,
            })
            .await
            .unwrap()
    }

    async fn view(&self, user_id: &UserId) -> EntitlementView {
        self.state
            .get_entitlement_handler()
            .handle(GetEntitlementQuery {
                user_id: user_id.clone(),
            })
            .await
            .unwrap()
    }

    async fn entry_status(&self, user_id: &UserId, entry_id: &PaymentEntryId) -> Option<RecordStatus> {
        self.payments
            .find_by_entry(user_id, entry_id)
            .await
            .unwrap()
            .map(|record| record.status)
    }

    async fn canonical_status(&self, user_id: &UserId, txn: &str) -> Option<RecordStatus> {
        self.payments
            .find_by_transaction(user_id, txn)
            .await
            .unwrap()
            .map(|record| record.status)
    }
}

#[tokio::test]
async fn trial_lapses_to_free_on_next_read() {
    let world = World::new();
    let user = world.register("u-trial").await;

    let started = world
        .state
        .start_trial_handler()
        .handle(StartTrialCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap();
    assert_eq!(started.plan, Plan::ProTrial);
    assert_eq!(started.trial_end_date, day_zero().add_days(30));

    world.clock.advance_days(30);
    let still_in_trial = world.view(&user).await;
    assert_eq!(still_in_trial.plan, Plan::ProTrial);
    assert!(still_in_trial.is_pro);

    world.clock.advance_days(1);
    let lapsed = world.view(&user).await;
    assert_eq!(lapsed.plan, Plan::Free);
    assert!(!lapsed.is_pro);
    assert_eq!(lapsed.trial_start_date, Some(day_zero()));
    assert!(!lapsed.trial_available);
}

#[tokio::test]
async fn lapsed_trial_cannot_be_restarted() {
    let world = World::new();
    let user = world.register("u-again").await;
    let start_trial = world.state.start_trial_handler();

    start_trial
        .handle(StartTrialCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap();
    world.clock.advance_days(45);
    assert_eq!(world.view(&user).await.plan, Plan::Free);

    let err = start_trial
        .handle(StartTrialCommand { user_id: user })
        .await
        .unwrap_err();
    assert!(matches!(err, EntitlementError::TrialAlreadyUsed));
}

#[tokio::test]
async fn approved_monthly_claim_grants_pro_and_completes_canonical_record() {
    let world = World::new();
    let user = world.register("u-pay").await;
    let entry_id = world.submit(&user, "TXN1", 500).await;

    let pending = world
        .state
        .list_pending_payments_handler()
        .handle(ListPendingPaymentsQuery)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].entry.id, entry_id);
    assert_eq!(
        world.canonical_status(&user, "TXN1").await,
        Some(RecordStatus::Pending)
    );

    let result = world.approve(&user, entry_id, PaidPlan::ProMonthly).await;
    assert!(result.applied);
    assert_eq!(result.entitlement.plan, Plan::ProMonthly);
    assert!(result.entitlement.is_pro);
    assert_eq!(
        result.entitlement.subscription_end_date,
        Some(day_zero().add_days(30))
    );
    assert!(!result.ledger.is_divergent());
    assert_eq!(
        world.canonical_status(&user, "TXN1").await,
        Some(RecordStatus::Completed)
    );

    world.clock.advance_days(31);
    let lapsed = world.view(&user).await;
    assert_eq!(lapsed.plan, Plan::Free);
    assert!(!lapsed.is_pro);
}

#[tokio::test]
async fn approved_cancellation_refunds_and_downgrades() {
    let world = World::new();
    let user = world.register("u-refund").await;
    let entry_id = world.submit(&user, "TXN1", 500).await;
    world.approve(&user, entry_id, PaidPlan::ProMonthly).await;

    world.clock.advance_days(5);
    world
        .state
        .request_cancellation_handler()
        .handle(RequestCancellationCommand {
            user_id: user.clone(),
            reason: "not using it".to_string(),
            refund_method: "bkash".to_string(),
            refund_account: "017XXXXXXX".to_string(),
        })
        .await
        .unwrap();

    let result = world
        .state
        .approve_cancellation_handler()
        .handle(ApproveCancellationCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap();

    assert_eq!(result.refund.amount, 500);
    assert_eq!(result.refund.entry_type, EntryType::Refund);
    assert!(result.refund.transaction_id.starts_with("REF-"));
    assert_eq!(result.entitlement.plan, Plan::Free);
    assert!(!result.entitlement.is_pro);
    assert!(result.entitlement.cancellation_request.is_none());
    assert!(matches!(
        result.ledger,
        Some(LedgerSync::Synced {
            status: RecordStatus::Refunded,
            ..
        })
    ));

    assert!(!result.refund_ledger.is_divergent());

    let original = result.entitlement.entry(&entry_id).unwrap();
    assert_eq!(original.status, EntryStatus::Refunded);
    assert_eq!(
        world.entry_status(&user, &entry_id).await,
        Some(RecordStatus::Refunded)
    );
    assert_eq!(
        world.entry_status(&user, &result.refund.id).await,
        Some(RecordStatus::Refunded)
    );
    assert_eq!(
        world.canonical_status(&user, &result.refund.transaction_id).await,
        Some(RecordStatus::Refunded)
    );
}

#[tokio::test]
async fn claims_sharing_a_transaction_id_are_settled_separately() {
    let world = World::new();
    let user = world.register("u-dup").await;
    let first = world.submit(&user, "TXN1", 500).await;
    let second = world.submit(&user, "TXN1", 500).await;

    world.approve(&user, first, PaidPlan::ProMonthly).await;
    world
        .state
        .reject_payment_handler()
        .handle(RejectPaymentCommand {
            user_id: user.clone(),
            entry_id: second,
        })
        .await
        .unwrap();

    assert_eq!(world.entry_status(&user, &first).await, Some(RecordStatus::Completed));
    assert_eq!(world.entry_status(&user, &second).await, Some(RecordStatus::Failed));

    let reconciled = world
        .state
        .reconcile_handler()
        .handle(ReconcileLedgerCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap();
    assert!(reconciled.repaired.is_empty());
    assert_eq!(reconciled.in_sync.len(), 2);
    assert_eq!(world.entry_status(&user, &first).await, Some(RecordStatus::Completed));
}

#[tokio::test]
async fn repeated_decisions_leave_the_record_unchanged() {
    let world = World::new();
    let user = world.register("u-twice").await;
    let entry_id = world.submit(&user, "TXN1", 500).await;

    let first = world.approve(&user, entry_id, PaidPlan::ProMonthly).await;
    assert!(first.applied);

    world.clock.advance_days(2);
    let second = world.approve(&user, entry_id, PaidPlan::ProLifetime).await;
    assert!(!second.applied);
    assert_eq!(second.entitlement.plan, Plan::ProMonthly);
    assert_eq!(
        second.entitlement.subscription_end_date,
        first.entitlement.subscription_end_date
    );

    let rejected = world
        .state
        .reject_payment_handler()
        .handle(RejectPaymentCommand {
            user_id: user.clone(),
            entry_id,
        })
        .await
        .unwrap();
    assert!(!rejected.applied);
    assert_eq!(rejected.entry.status, EntryStatus::Approved);
    assert_eq!(world.view(&user).await.plan, Plan::ProMonthly);
}

#[tokio::test]
async fn ledger_outage_does_not_block_approval_and_is_repaired_later() {
    let world = World::new();
    let user = world.register("u-ledger").await;
    let entry_id = world.submit(&user, "TXN1", 500).await;

    world.payments.fail_updates(true);
    let result = world.approve(&user, entry_id, PaidPlan::ProLifetime).await;
    assert!(result.applied);
    assert_eq!(result.entitlement.plan, Plan::ProLifetime);
    assert!(matches!(result.ledger, LedgerSync::Failed { .. }));
    assert_eq!(
        world.canonical_status(&user, "TXN1").await,
        Some(RecordStatus::Pending)
    );

    world.payments.fail_updates(false);
    let reconciled = world
        .state
        .reconcile_handler()
        .handle(ReconcileLedgerCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap();
    assert_eq!(reconciled.repaired, vec!["TXN1".to_string()]);
    assert_eq!(
        world.canonical_status(&user, "TXN1").await,
        Some(RecordStatus::Completed)
    );
}

#[tokio::test]
async fn concurrent_decisions_on_one_user_both_land() {
    let world = World::new();
    let user = world.register("u-race").await;
    let first = world.submit(&user, "TXN1", 500).await;
    let second = world.submit(&user, "TXN2", 700).await;

    let approve = world.state.approve_payment_handler();
    let reject = world.state.reject_payment_handler();
    let (approved, rejected) = tokio::join!(
        approve.handle(ApprovePaymentCommand {
            user_id: user.clone(),
            entry_id: first,
            plan_type: PaidPlan::ProMonthly,
        }),
        reject.handle(RejectPaymentCommand {
            user_id: user.clone(),
            entry_id: second,
        }),
    );
    assert!(approved.unwrap().applied);
    assert!(rejected.unwrap().applied);

    let record = world
        .entitlements
        .find_by_user_id(&user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.entry(&first).unwrap().status, EntryStatus::Approved);
    assert_eq!(record.entry(&second).unwrap().status, EntryStatus::Rejected);
    assert_eq!(record.plan, Plan::ProMonthly);
}
