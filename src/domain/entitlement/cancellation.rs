//! User-initiated cancellation requests.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Where a cancellation request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationStatus {
    Pending,
    Rejected,
}

/// A request to cancel the current plan and refund the last payment.
///
/// Approved requests are removed from the record; rejected ones stay
/// visible until the user files a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub reason: String,
    pub refund_method: String,
    pub refund_account: String,
    pub requested_at: Timestamp,
    pub status: CancellationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,
}

impl CancellationRequest {
    /// Creates a pending request.
    ///
    /// # Errors
    ///
    /// Refund method and account are required so the admin can pay out.
    pub fn new(
        reason: impl Into<String>,
        refund_method: impl Into<String>,
        refund_account: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let refund_method = refund_method.into().trim().to_string();
        let refund_account = refund_account.into().trim().to_string();
        if refund_method.is_empty() {
            return Err(ValidationError::empty_field("refund_method"));
        }
        if refund_account.is_empty() {
            return Err(ValidationError::empty_field("refund_account"));
        }

        Ok(Self {
            reason: reason.into().trim().to_string(),
            refund_method,
            refund_account,
            requested_at: now,
            status: CancellationStatus::Pending,
            note: None,
            resolved_at: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == CancellationStatus::Pending
    }

    /// Marks the request declined.
    pub fn reject(&mut self, note: Option<String>, now: Timestamp) {
        self.status = CancellationStatus::Rejected;
        self.note = note.filter(|n| !n.trim().is_empty());
        self.resolved_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_pending() {
        let req = CancellationRequest::new("moving on", "bkash", "017XXXXXXX", Timestamp::now())
            .unwrap();
        assert!(req.is_pending());
        assert!(req.note.is_none());
    }

    #[test]
    fn refund_account_is_required() {
        let err = CancellationRequest::new("", "bkash", "  ", Timestamp::now()).unwrap_err();
        assert_eq!(err.field(), "refund_account");
    }

    #[test]
    fn reject_records_note_and_time() {
        let now = Timestamp::now();
        let mut req = CancellationRequest::new("", "nagad", "018", now).unwrap();
        req.reject(Some("outside refund window".into()), now);
        assert!(!req.is_pending());
        assert_eq!(req.note.as_deref(), Some("outside refund window"));
        assert_eq!(req.resolved_at, Some(now));
    }

    #[test]
    fn blank_note_is_dropped() {
        let now = Timestamp::now();
        let mut req = CancellationRequest::new("", "nagad", "018", now).unwrap();
        req.reject(Some("   ".into()), now);
        assert!(req.note.is_none());
    }
}
