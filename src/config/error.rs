//! Errors raised while loading or checking configuration.

use thiserror::Error;

/// Loading failed, or the loaded values did not pass `validate`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A single rejected setting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required setting PRO_ENTITLEMENTS__{0}")]
    MissingRequired(&'static str),

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("cannot bind to {0}")]
    InvalidBindAddress(String),

    #[error("timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database url must use the postgres:// scheme")]
    InvalidDatabaseUrl,

    #[error("database pool needs 0 < min_connections <= max_connections")]
    InvalidPoolSize,

    #[error("database pool larger than 100 connections")]
    PoolSizeTooLarge,

    #[error("JWT secret must be at least {0} bytes in production")]
    JwtSecretTooShort(usize),

    #[error("{field} must be between 1 and {max}")]
    OutOfRange { field: &'static str, max: i64 },

    #[error("Refund prefix cannot be empty")]
    EmptyRefundPrefix,
}
