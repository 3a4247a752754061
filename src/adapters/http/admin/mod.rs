//! HTTP adapter for admin adjudication and reporting.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::admin_routes;
