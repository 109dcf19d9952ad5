//! CLI configuration module.
//!
//! Layered with the `config` crate, later sources win:
//! 1. Built-in defaults
//! 2. `marketplace.toml` in the working directory (optional; another path
//!    can be given with `MARKETPLACE_CONFIG`)
//! 3. Environment: `MARKETPLACE_DATABASE_PATH`, `MARKETPLACE_MAX_CONNECTIONS`,
//!    `MARKETPLACE_LOG_FILTER`

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use marketplace_db::DbConfig;

const DEFAULT_CONFIG_FILE: &str = "marketplace.toml";
const DEFAULT_DATABASE_PATH: &str = "./marketplace.db";
const DEFAULT_MAX_CONNECTIONS: i64 = 5;
const DEFAULT_LOG_FILTER: &str = "info,marketplace=debug,sqlx=warn";

/// CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// `tracing` filter directives, used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var("MARKETPLACE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file)
    }

    fn load_from(file: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("max_connections", DEFAULT_MAX_CONNECTIONS)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("MARKETPLACE").try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("database_path".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        Ok(())
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_from("/nonexistent/marketplace.toml").unwrap();

        assert_eq!(config.max_connections as i64, DEFAULT_MAX_CONNECTIONS);
        assert!(!config.log_filter.is_empty());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_config(
            "marketplace-file",
            "database_path = \"/tmp/orders.db\"\nmax_connections = 2\n",
        );

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/orders.db"));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.db_config().max_connections, 2);
    }

    #[test]
    fn test_zero_connections_rejected() {
        let path = write_config("marketplace-zero", "max_connections = 0\n");

        let result = AppConfig::load_from(path.to_str().unwrap());
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }
}
