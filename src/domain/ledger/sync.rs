//! Outcome of mirroring an embedded entry onto its canonical record.

use serde::{Deserialize, Serialize};

use super::RecordStatus;

/// How the canonical facet fared after an entitlement change.
///
/// The embedded entry is authoritative; anything but `Synced` is a
/// consistency warning for an operator, never a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "outcome",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum LedgerSync {
    /// Record found and now carries `status`; `changed` is false when it
    /// already did.
    Synced {
        transaction_id: String,
        status: RecordStatus,
        changed: bool,
    },
    /// No canonical record exists for the transaction.
    RecordMissing { transaction_id: String },
    /// Storage failed while syncing.
    Failed {
        transaction_id: String,
        reason: String,
    },
}

impl LedgerSync {
    /// True when the two facets may disagree.
    pub fn is_divergent(&self) -> bool {
        !matches!(self, LedgerSync::Synced { .. })
    }

    pub fn transaction_id(&self) -> &str {
        match self {
            LedgerSync::Synced { transaction_id, .. }
            | LedgerSync::RecordMissing { transaction_id }
            | LedgerSync::Failed { transaction_id, .. } => transaction_id,
        }
    }
}
