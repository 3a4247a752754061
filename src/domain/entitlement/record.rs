//! User entitlement aggregate.
//!
//! One record per user. It owns the plan, the trial dates, the embedded
//! payment history and the pending cancellation request.
//!
//! # Invariants
//!
//! - `is_pro` matches [`UserEntitlement::derive_is_pro`] after every mutation
//!   made through this type, and after [`UserEntitlement::enforce_expiration`]
//! - `trial_redeemed_at` is write-once; a redeemed trial is never reissued
//! - `payment_history` is append-only; entries only change status in place
//! - at most one cancellation request is pending
//!
//! All time-dependent methods take `now` so callers decide the clock.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentEntryId, Timestamp, UserId};

use super::{
    CancellationRequest, EmbeddedPaymentEntry, EntitlementError, EntryStatus, PaidPlan, Plan,
};

/// Persisted entitlement state of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntitlement {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub plan: Plan,
    pub is_pro: bool,
    pub trial_start_date: Option<Timestamp>,
    pub trial_end_date: Option<Timestamp>,
    /// Set with the first trial and never cleared.
    pub trial_redeemed_at: Option<Timestamp>,
    pub subscription_end_date: Option<Timestamp>,
    pub payment_history: Vec<EmbeddedPaymentEntry>,
    pub cancellation_request: Option<CancellationRequest>,
    /// Optimistic concurrency token, bumped by the repository on every update.
    pub version: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// What the expiration check did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// Nothing to change.
    Current,
    /// A lapsed trial or monthly plan was downgraded to `Free`.
    Downgraded { from: Plan },
    /// The plan was valid but the cached `is_pro` flag had drifted.
    FlagRepaired,
}

impl Enforcement {
    pub fn changed(&self) -> bool {
        !matches!(self, Enforcement::Current)
    }
}

/// Result of applying an admin decision to one embedded entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjudication {
    /// The entry after the decision (or unchanged, if it was already decided).
    pub entry: EmbeddedPaymentEntry,
    /// False when the entry had been decided before and nothing changed.
    pub applied: bool,
}

/// Result of approving a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundOutcome {
    /// The appended refund entry.
    pub refund: EmbeddedPaymentEntry,
    /// The subscription entry the refund reverses, now `Refunded`.
    pub refunded_entry: Option<EmbeddedPaymentEntry>,
}

impl UserEntitlement {
    /// Creates the record a new user starts with.
    pub fn register(
        user_id: UserId,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            user_email: user_email.into(),
            plan: Plan::Free,
            is_pro: false,
            trial_start_date: None,
            trial_end_date: None,
            trial_redeemed_at: None,
            subscription_end_date: None,
            payment_history: Vec::new(),
            cancellation_request: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the plan grants Pro features at `now`.
    ///
    /// Paid plans always do. A trial does while `now <= trial_end_date`.
    pub fn derive_is_pro(&self, now: Timestamp) -> bool {
        match self.plan {
            Plan::Free => false,
            Plan::ProMonthly | Plan::ProLifetime => true,
            Plan::ProTrial => self
                .trial_end_date
                .map(|end| !now.is_after(&end))
                .unwrap_or(false),
        }
    }

    /// Whether the stored plan has lapsed at `now`.
    ///
    /// A trial without an end date is treated as lapsed. A monthly plan
    /// without an end date is not.
    pub fn is_lapsed(&self, now: Timestamp) -> bool {
        match self.plan {
            Plan::Free | Plan::ProLifetime => false,
            Plan::ProTrial => !self.derive_is_pro(now),
            Plan::ProMonthly => self
                .subscription_end_date
                .map(|end| now.is_after(&end))
                .unwrap_or(false),
        }
    }

    /// Lazily downgrades a lapsed plan and re-derives `is_pro`.
    ///
    /// `trial_start_date` survives the downgrade.
    pub fn enforce_expiration(&mut self, now: Timestamp) -> Enforcement {
        if self.is_lapsed(now) {
            let from = self.plan;
            self.plan = Plan::Free;
            self.is_pro = false;
            self.trial_end_date = None;
            self.subscription_end_date = None;
            self.updated_at = now;
            return Enforcement::Downgraded { from };
        }

        let expected = self.derive_is_pro(now);
        if self.is_pro != expected {
            self.is_pro = expected;
            self.updated_at = now;
            return Enforcement::FlagRepaired;
        }

        Enforcement::Current
    }

    /// Grants the one-time trial.
    ///
    /// # Errors
    ///
    /// - `AlreadySubscribed` if the plan is not `Free`
    /// - `TrialAlreadyUsed` if a trial was ever redeemed
    pub fn start_trial(
        &mut self,
        trial_days: i64,
        now: Timestamp,
    ) -> Result<Timestamp, EntitlementError> {
        if self.plan != Plan::Free {
            return Err(EntitlementError::AlreadySubscribed { plan: self.plan });
        }
        if self.trial_redeemed_at.is_some() || self.trial_start_date.is_some() {
            return Err(EntitlementError::TrialAlreadyUsed);
        }

        let end = now.add_days(trial_days);
        self.plan = Plan::ProTrial;
        self.is_pro = true;
        self.trial_start_date = Some(now);
        self.trial_end_date = Some(end);
        self.trial_redeemed_at = Some(now);
        self.updated_at = now;
        Ok(end)
    }

    /// Appends a pending claim. Never touches the plan.
    pub fn record_claim(&mut self, entry: EmbeddedPaymentEntry, now: Timestamp) {
        self.payment_history.push(entry);
        self.updated_at = now;
    }

    pub fn entry(&self, entry_id: &PaymentEntryId) -> Option<&EmbeddedPaymentEntry> {
        self.payment_history.iter().find(|e| e.id == *entry_id)
    }

    /// Entries still waiting for an admin decision.
    pub fn pending_entries(&self) -> impl Iterator<Item = &EmbeddedPaymentEntry> {
        self.payment_history
            .iter()
            .filter(|e| e.is_subscription() && e.status == EntryStatus::Pending)
    }

    fn subscription_entry_mut(
        &mut self,
        entry_id: &PaymentEntryId,
        attempted: &str,
    ) -> Result<&mut EmbeddedPaymentEntry, EntitlementError> {
        let entry = self
            .payment_history
            .iter_mut()
            .find(|e| e.id == *entry_id)
            .ok_or(EntitlementError::EntryNotFound(*entry_id))?;
        if !entry.is_subscription() {
            return Err(EntitlementError::invalid_state("a refund entry", attempted));
        }
        Ok(entry)
    }

    /// Approves a pending claim and grants `plan`.
    ///
    /// Clears both trial dates; the redemption marker keeps the trial used.
    /// A monthly plan runs `subscription_days` from `now`. An entry that was
    /// already decided is returned unchanged with `applied = false`.
    pub fn approve_payment(
        &mut self,
        entry_id: &PaymentEntryId,
        plan: PaidPlan,
        subscription_days: i64,
        now: Timestamp,
    ) -> Result<Adjudication, EntitlementError> {
        let entry = self.subscription_entry_mut(entry_id, "approve")?;
        if entry.status.is_decided() {
            return Ok(Adjudication {
                entry: entry.clone(),
                applied: false,
            });
        }
        entry.transition(EntryStatus::Approved)?;
        let entry = entry.clone();

        self.plan = plan.into();
        self.is_pro = true;
        self.trial_start_date = None;
        self.trial_end_date = None;
        self.subscription_end_date = if plan.is_time_boxed() {
            Some(now.add_days(subscription_days))
        } else {
            None
        };
        self.updated_at = now;

        Ok(Adjudication {
            entry,
            applied: true,
        })
    }

    /// Rejects a pending claim. The plan is left alone.
    pub fn reject_payment(
        &mut self,
        entry_id: &PaymentEntryId,
        now: Timestamp,
    ) -> Result<Adjudication, EntitlementError> {
        let entry = self.subscription_entry_mut(entry_id, "reject")?;
        if entry.status.is_decided() {
            return Ok(Adjudication {
                entry: entry.clone(),
                applied: false,
            });
        }
        entry.transition(EntryStatus::Rejected)?;
        let entry = entry.clone();
        self.updated_at = now;

        Ok(Adjudication {
            entry,
            applied: true,
        })
    }

    pub fn has_pending_cancellation(&self) -> bool {
        self.cancellation_request
            .as_ref()
            .map(CancellationRequest::is_pending)
            .unwrap_or(false)
    }

    /// Files a cancellation request.
    ///
    /// # Errors
    ///
    /// - `NoActivePlan` on `Free`
    /// - `RequestAlreadyPending` if one is still open
    pub fn request_cancellation(
        &mut self,
        request: CancellationRequest,
        now: Timestamp,
    ) -> Result<(), EntitlementError> {
        if self.plan == Plan::Free {
            return Err(EntitlementError::NoActivePlan);
        }
        if self.has_pending_cancellation() {
            return Err(EntitlementError::RequestAlreadyPending);
        }
        self.cancellation_request = Some(request);
        self.updated_at = now;
        Ok(())
    }

    /// Most recent approved subscription entry, the one a refund reverses.
    pub fn latest_approved_subscription(&self) -> Option<&EmbeddedPaymentEntry> {
        self.payment_history
            .iter()
            .rev()
            .find(|e| e.is_subscription() && e.status == EntryStatus::Approved)
    }

    /// Approves the pending cancellation: refunds, downgrades, clears the request.
    ///
    /// The refund transaction id is `refund_prefix` followed by `now` in
    /// epoch milliseconds.
    pub fn approve_cancellation(
        &mut self,
        refund_prefix: &str,
        now: Timestamp,
    ) -> Result<RefundOutcome, EntitlementError> {
        let request = match self.cancellation_request.take() {
            Some(request) if request.is_pending() => request,
            other => {
                self.cancellation_request = other;
                return Err(EntitlementError::NoRequestPending);
            }
        };

        let original_idx = self
            .payment_history
            .iter()
            .rposition(|e| e.is_subscription() && e.status == EntryStatus::Approved);

        let (amount, refund_of, refunded_entry) = match original_idx {
            Some(idx) => {
                let original = &mut self.payment_history[idx];
                original.transition(EntryStatus::Refunded)?;
                (
                    original.amount,
                    Some(original.transaction_id.clone()),
                    Some(original.clone()),
                )
            }
            None => (0, None, None),
        };

        let refund = EmbeddedPaymentEntry::refund(
            format!("{}{}", refund_prefix, now.as_unix_millis()),
            request.refund_method,
            amount,
            refund_of,
            now,
        );
        self.payment_history.push(refund.clone());

        self.plan = Plan::Free;
        self.is_pro = false;
        self.subscription_end_date = None;
        self.trial_end_date = None;
        self.updated_at = now;

        Ok(RefundOutcome {
            refund,
            refunded_entry,
        })
    }

    /// Declines the pending cancellation. The plan is left alone.
    pub fn reject_cancellation(
        &mut self,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<CancellationRequest, EntitlementError> {
        let request = self
            .cancellation_request
            .as_mut()
            .filter(|r| r.is_pending())
            .ok_or(EntitlementError::NoRequestPending)?;
        request.reject(note, now);
        let request = request.clone();
        self.updated_at = now;
        Ok(request)
    }
}
