//! Clock port.
//!
//! Every time-dependent rule (trial length, subscription end, expiration)
//! reads the current instant through this port so tests can pin it.

use crate::domain::foundation::Timestamp;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
