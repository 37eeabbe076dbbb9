//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional TOML file overlaid with `CIMAISE__`-prefixed environment
//! variables. Every field carries a default so a bare checkout boots.

pub mod database;
pub mod logging;
pub mod plugin;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::plugin::PluginConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CIMAISE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Plugin system settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the given TOML file (optional), an
    /// environment-specific overlay next to it, then `CIMAISE__*` variables.
    ///
    /// The overlay name comes from `CIMAISE_ENV` (e.g. `config/test.toml`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Ok(env) = std::env::var("CIMAISE_ENV") {
            let dir = std::path::Path::new(path)
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| ".".to_string());
            builder = builder
                .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Sanity checks that cannot be expressed through serde defaults.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::configuration(
                "database.max_connections must be at least 1",
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::configuration(
                "database.min_connections exceeds max_connections",
            ));
        }
        if self.plugins.entry_file.trim().is_empty() {
            return Err(AppError::configuration("plugins.entry_file must not be empty"));
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(AppError::configuration(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{other}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load("does/not/exist.toml").expect("defaults");
        assert_eq!(config.plugins.directory, "./plugins");
        assert_eq!(config.plugins.entry_file, "plugin.manifest");
        assert!(config.plugins.auto_load);
        assert_eq!(config.logging.level, "info");
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(
            file,
            "[plugins]\ndirectory = \"/srv/plugins\"\nauto_load = false\n\n[logging]\nformat = \"json\""
        )
        .expect("write");

        let config = AppConfig::load(path.to_str().expect("utf8")).expect("load");
        assert_eq!(config.plugins.directory, "/srv/plugins");
        assert!(!config.plugins.auto_load);
        assert_eq!(config.plugins.entry_file, "plugin.manifest");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }
}
