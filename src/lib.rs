//! Pro Entitlements - entitlement lifecycle and manual payment reconciliation.
//!
//! Users hold one of four plans (free, one-time trial, monthly, lifetime).
//! Paid plans are granted by an admin approving a payment claim the user
//! submitted; cancellations are approved with a recorded refund. Expiry is
//! enforced lazily on the user's next request.
//!
//! Every payment lives in two places: embedded in the user's entitlement
//! record (authoritative for access) and as a canonical record in the
//! payment ledger (used for reporting). The two are kept in step by
//! transaction id, best-effort.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
