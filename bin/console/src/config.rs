//! Console configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `CREDIT_OFFICE_`. Nested keys use `__`, for example
//! `CREDIT_OFFICE_API__BASE_URL` or
//! `CREDIT_OFFICE_SESSION__EXPIRY_WARNING_MINUTES`.

use credit_office_api::ApiConfig;
use credit_office_auth::SessionConfig;
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "CREDIT_OFFICE";

/// Console configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// Back-end API configuration.
    pub api: ApiConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// File holding the persisted session record between invocations.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".credit-office-session.json")
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(environment())
    }

    fn load(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
