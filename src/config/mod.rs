//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `PRO_ENTITLEMENTS` prefix; nested values use `__` as separator.
//!
//! ```no_run
//! use pro_entitlements::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod entitlement;
mod error;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use entitlement::EntitlementConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL settings; in-memory storage when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    pub auth: AuthConfig,

    #[serde(default)]
    pub entitlement: EntitlementConfig,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// - `PRO_ENTITLEMENTS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PRO_ENTITLEMENTS__AUTH__JWT_SECRET=...` -> `auth.jwt_secret = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PRO_ENTITLEMENTS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    ///
    /// Production requires a database; other environments may run in memory.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        match &self.database {
            Some(database) => database.validate()?,
            None if self.is_production() => {
                return Err(ValidationError::MissingRequired("DATABASE__URL"))
            }
            None => {}
        }
        self.auth.validate(&self.server.environment)?;
        self.entitlement.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PRO_ENTITLEMENTS__AUTH__JWT_SECRET",
        "PRO_ENTITLEMENTS__AUTH__ISSUER",
        "PRO_ENTITLEMENTS__DATABASE__URL",
        "PRO_ENTITLEMENTS__SERVER__PORT",
        "PRO_ENTITLEMENTS__SERVER__ENVIRONMENT",
        "PRO_ENTITLEMENTS__ENTITLEMENT__TRIAL_DAYS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn set_minimal_env() {
        env::set_var("PRO_ENTITLEMENTS__AUTH__JWT_SECRET", "dev-secret");
        env::set_var("PRO_ENTITLEMENTS__AUTH__ISSUER", "https://id.example.com");
    }

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_minimal_env();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.database.is_none());
        assert_eq!(config.entitlement.trial_days, 30);
        assert!(config.validate().is_ok());

        clear_env();
    }

    #[test]
    fn test_load_reads_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_minimal_env();
        env::set_var("PRO_ENTITLEMENTS__SERVER__PORT", "3000");
        env::set_var("PRO_ENTITLEMENTS__ENTITLEMENT__TRIAL_DAYS", "14");
        env::set_var("PRO_ENTITLEMENTS__DATABASE__URL", "postgres://localhost/entitlements");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.entitlement.trial_days, 14);
        assert_eq!(
            config
                .database
                .map(|d| d.url.expose_secret().to_string())
                .as_deref(),
            Some("postgres://localhost/entitlements")
        );

        clear_env();
    }

    #[test]
    fn test_missing_auth_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_production_requires_database() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_minimal_env();
        env::set_var(
            "PRO_ENTITLEMENTS__AUTH__JWT_SECRET",
            "a-production-secret-of-32-bytes!!",
        );
        env::set_var("PRO_ENTITLEMENTS__SERVER__ENVIRONMENT", "production");

        let config = AppConfig::load().unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        );

        clear_env();
    }
}
