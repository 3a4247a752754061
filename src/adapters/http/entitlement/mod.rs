//! HTTP adapter for the caller's own entitlement.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::entitlement_routes;
