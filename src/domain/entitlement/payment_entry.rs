//! Payment entries embedded in a user's payment history.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentEntryId, StateMachine, Timestamp, ValidationError};

use super::PaidPlan;

/// Whether an entry is a claim for a plan or a refund issued against one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Subscription,
    Refund,
}

/// Adjudication status of an embedded entry.
///
/// `Pending -> Approved | Rejected`, `Approved -> Refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
    Refunded,
}

impl EntryStatus {
    /// True once an administrator has decided the claim.
    pub fn is_decided(&self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
            EntryStatus::Refunded => "refunded",
        }
    }
}

impl StateMachine for EntryStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EntryStatus::*;
        matches!(
            (self, target),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EntryStatus::*;
        match self {
            Pending => vec![Approved, Rejected],
            Approved => vec![Refunded],
            Rejected | Refunded => vec![],
        }
    }
}

/// One monetary fact stored inside the user's own record.
///
/// Its canonical payment record carries the entry's `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedPaymentEntry {
    pub id: PaymentEntryId,
    pub transaction_id: String,
    pub method: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<PaidPlan>,
    pub status: EntryStatus,
    pub date: Timestamp,
    /// Transaction id of the subscription this refund reverses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_of: Option<String>,
}

impl EmbeddedPaymentEntry {
    /// Creates a pending subscription claim from client input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the transaction id or method is blank,
    /// or the amount is not positive.
    pub fn subscription_claim(
        transaction_id: impl Into<String>,
        method: impl Into<String>,
        amount: i64,
        plan_type: PaidPlan,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let transaction_id = transaction_id.into().trim().to_string();
        let method = method.into().trim().to_string();

        if transaction_id.is_empty() {
            return Err(ValidationError::empty_field("transaction_id"));
        }
        if method.is_empty() {
            return Err(ValidationError::empty_field("method"));
        }
        if amount <= 0 {
            return Err(ValidationError::not_positive("amount", amount));
        }

        Ok(Self {
            id: PaymentEntryId::new(),
            transaction_id,
            method,
            amount,
            entry_type: EntryType::Subscription,
            plan_type: Some(plan_type),
            status: EntryStatus::Pending,
            date: now,
            refund_of: None,
        })
    }

    /// Creates an already-settled refund entry.
    pub fn refund(
        transaction_id: String,
        method: String,
        amount: i64,
        refund_of: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: PaymentEntryId::new(),
            transaction_id,
            method,
            amount,
            entry_type: EntryType::Refund,
            plan_type: None,
            status: EntryStatus::Refunded,
            date: now,
            refund_of,
        }
    }

    pub fn is_subscription(&self) -> bool {
        self.entry_type == EntryType::Subscription
    }

    /// Moves the entry along its lifecycle.
    pub fn transition(&mut self, target: EntryStatus) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        Ok(())
    }
}
