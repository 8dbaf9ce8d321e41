//! CLI configuration.
//!
//! Values come from environment variables (a `.env` file is loaded first by
//! `main`), with fallback to defaults. Command-line flags override both.

use std::env;
use std::path::PathBuf;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "bookstore.db";

/// Default fixture file, relative to the working directory.
pub const DEFAULT_FIXTURE_PATH: &str = "fixtures/test_data.json";

/// Runtime configuration of the `bookstore` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file (`BOOKSTORE_DB_PATH`)
    pub db_path: PathBuf,

    /// JSON fixture to import (`BOOKSTORE_FIXTURE`)
    pub fixture_path: PathBuf,

    /// Pool size (`BOOKSTORE_MAX_CONNECTIONS`, default: 5)
    pub max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections: u32 = lookup("BOOKSTORE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BOOKSTORE_MAX_CONNECTIONS".to_string()))?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "BOOKSTORE_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(AppConfig {
            db_path: lookup("BOOKSTORE_DB_PATH")
                .filter(|path| !path.is_empty())
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            fixture_path: lookup("BOOKSTORE_FIXTURE")
                .filter(|path| !path.is_empty())
                .unwrap_or_else(|| DEFAULT_FIXTURE_PATH.to_string())
                .into(),
            max_connections,
        })
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, db_path: Option<PathBuf>, fixture_path: Option<PathBuf>) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        if let Some(path) = fixture_path {
            self.fixture_path = path;
        }
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.fixture_path, PathBuf::from(DEFAULT_FIXTURE_PATH));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_env_values_and_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BOOKSTORE_DB_PATH", "/tmp/shop.db"),
            ("BOOKSTORE_FIXTURE", "data.json"),
            ("BOOKSTORE_MAX_CONNECTIONS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.max_connections, 2);

        let config = config.with_overrides(Some("other.db".into()), None);
        assert_eq!(config.db_path, PathBuf::from("other.db"));
        assert_eq!(config.fixture_path, PathBuf::from("data.json"));
    }

    #[test]
    fn test_invalid_pool_size() {
        for value in ["zero", "0", "-1"] {
            let err = AppConfig::from_lookup(lookup(&[("BOOKSTORE_MAX_CONNECTIONS", value)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "BOOKSTORE_MAX_CONNECTIONS"));
        }
    }
}
