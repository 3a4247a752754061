//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `entitlement` - Plan lifecycle, trials, payment claims, cancellations
//! - `ledger` - Canonical payment records and revenue reporting

pub mod entitlement;
pub mod foundation;
pub mod ledger;
