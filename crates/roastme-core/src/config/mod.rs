//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod link;
pub mod logging;
pub mod realtime;
pub mod store;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::link::{LinkConfig, MAX_TTL_SECONDS};
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::store::{DatabaseConfig, StoreConfig};
pub use self::worker::WorkerConfig;

use crate::error::AppError;
use crate::types::id::MIN_LINK_ID_LENGTH;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Link lifecycle settings.
    #[serde(default)]
    pub link: LinkConfig,
    /// Document store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Session event fan-out settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Background sweep settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config_file`, an environment-specific overlay at
    /// `config/{env}`, and environment variables prefixed with `ROASTME__`
    /// (e.g. `ROASTME__LINK__TTL_SECONDS=600`).
    pub fn load(config_file: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(config_file).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ROASTME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break link invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.link.ttl_seconds == 0 {
            return Err(AppError::configuration("link.ttl_seconds must be positive"));
        }
        if self.link.ttl_seconds > MAX_TTL_SECONDS {
            return Err(AppError::configuration(format!(
                "link.ttl_seconds must be at most {MAX_TTL_SECONDS}"
            )));
        }
        if self.link.id_length < MIN_LINK_ID_LENGTH {
            return Err(AppError::configuration(format!(
                "link.id_length must be at least {MIN_LINK_ID_LENGTH}"
            )));
        }
        if self.link.cascade_retry_attempts == 0 {
            return Err(AppError::configuration(
                "link.cascade_retry_attempts must be at least 1",
            ));
        }
        if self.realtime.channel_capacity == 0 {
            return Err(AppError::configuration(
                "realtime.channel_capacity must be positive",
            ));
        }
        match self.store.provider.as_str() {
            "memory" | "postgres" => Ok(()),
            other => Err(AppError::configuration(format!(
                "Unknown store provider: '{other}'. Supported: memory, postgres"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.link.ttl_seconds, 1800);
        assert_eq!(config.link.id_length, 10);
        assert_eq!(config.link.cascade_retry_attempts, 3);
        assert_eq!(config.store.provider, "memory");
        assert_eq!(config.realtime.channel_capacity, 256);
        assert!(config.worker.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = from_json("{}");
        assert_eq!(config.link.ttl_seconds, 1800);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_short_ids() {
        let mut config = AppConfig::default();
        config.link.id_length = 6;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_validate_bounds_ttl() {
        let mut config = AppConfig::default();
        config.link.ttl_seconds = 10_000_000_000_000;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);

        config.link.ttl_seconds = MAX_TTL_SECONDS;
        assert!(config.validate().is_ok());
        config.link.ttl_seconds = MAX_TTL_SECONDS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = AppConfig::default();
        config.store.provider = "firestore".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_files_falls_back_to_defaults() {
        let config = AppConfig::load("config/does-not-exist", "no-such-env").expect("load");
        assert_eq!(config.link.ttl_seconds, 1800);
    }

    fn from_json(json: &str) -> AppConfig {
        serde_json::from_str(json).expect("deserialize")
    }
}
