//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token validation and caller extractors
//! - `expiration` - Lazy expiration (and first-visit registration) for user routes

pub mod auth;
pub mod expiration;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAdmin, RequireAuth};
pub use expiration::expiration_guard;
