//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory repositories with the same version semantics as Postgres
//! - `postgres` - sqlx-backed repositories
//! - `auth` - Session validators (HS256 JWT, mock)
//! - `clock` - System and fixed clocks
//! - `http` - axum routes, middleware and DTOs

pub mod auth;
pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;

pub use auth::{JwtConfig, JwtSessionValidator, MockSessionValidator};
pub use clock::{FixedClock, SystemClock};
pub use memory::{InMemoryEntitlementRepository, InMemoryPaymentRecordRepository};
pub use postgres::{PostgresEntitlementRepository, PostgresPaymentRecordRepository};
