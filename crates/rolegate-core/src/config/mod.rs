//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `ROLEGATE__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod access;
pub mod logging;
pub mod persistence;

use serde::{Deserialize, Serialize};

use self::access::AccessConfig;
use self::logging::LoggingConfig;
use self::persistence::PersistenceConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Access-control settings.
    #[serde(default)]
    pub access: AccessConfig,
    /// Persistence settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for a named environment.
    ///
    /// Merges `config/default` with the `config/{env}` overlay and
    /// environment variables prefixed with `ROLEGATE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        Self::finish(builder)
    }

    /// Load configuration from an explicit file, then environment variables.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn from_file(path: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("ROLEGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
