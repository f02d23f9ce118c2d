//! # Application Configuration
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! | Variable                         | Default          |
//! |----------------------------------|------------------|
//! | `APOTHECA_DB_PATH`               | `./apotheca.db`  |
//! | `APOTHECA_MAX_CONNECTIONS`       | `5`              |
//! | `APOTHECA_REQUIRE_AUTH`          | `false`          |
//! | `APOTHECA_REJECT_NEGATIVE_STOCK` | `false`          |
//! | `APOTHECA_LOG`                   | (unset)          |
//!
//! `APOTHECA_LOG` is a tracing filter directive used when `RUST_LOG` is
//! absent.

use std::env;
use std::path::PathBuf;

use apotheca_db::{DbConfig, StockPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "./apotheca.db";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite file, or `:memory:`.
    pub db_path: PathBuf,

    /// Pool size.
    pub max_connections: u32,

    /// Whether actions refuse to run without an authenticated session.
    pub require_auth: bool,

    /// Stock policy for sale writes.
    pub stock_policy: StockPolicy,

    /// Log filter override.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: 5,
            require_auth: false,
            stock_policy: StockPolicy::AllowNegative,
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let max_connections = match lookup("APOTHECA_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("APOTHECA_MAX_CONNECTIONS".to_string()))?,
            None => defaults.max_connections,
        };

        let reject_negative = parse_flag(&lookup, "APOTHECA_REJECT_NEGATIVE_STOCK")?.unwrap_or(false);

        Ok(AppConfig {
            db_path: lookup("APOTHECA_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            max_connections,
            require_auth: parse_flag(&lookup, "APOTHECA_REQUIRE_AUTH")?
                .unwrap_or(defaults.require_auth),
            stock_policy: if reject_negative {
                StockPolicy::RejectNegative
            } else {
                StockPolicy::AllowNegative
            },
            log_filter: lookup("APOTHECA_LOG").filter(|f| !f.trim().is_empty()),
        })
    }

    /// Database configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        let base = if self.db_path.as_os_str() == apotheca_db::pool::IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.db_path).max_connections(self.max_connections)
        };
        base.stock_policy(self.stock_policy)
    }
}

/// Parses a boolean environment flag (`true/false`, `1/0`, `yes/no`).
fn parse_flag<F>(lookup: &F, key: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.db_config().stock_policy, StockPolicy::AllowNegative);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APOTHECA_DB_PATH", "/var/lib/apotheca/sales.db"),
            ("APOTHECA_MAX_CONNECTIONS", "8"),
            ("APOTHECA_REQUIRE_AUTH", "yes"),
            ("APOTHECA_REJECT_NEGATIVE_STOCK", "1"),
            ("APOTHECA_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/apotheca/sales.db"));
        assert_eq!(config.max_connections, 8);
        assert!(config.require_auth);
        assert_eq!(config.stock_policy, StockPolicy::RejectNegative);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.stock_policy, StockPolicy::RejectNegative);
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[("APOTHECA_MAX_CONNECTIONS", "many")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("APOTHECA_MAX_CONNECTIONS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("APOTHECA_REQUIRE_AUTH", "maybe")])).is_err());
    }

    #[test]
    fn test_memory_path_uses_in_memory_config() {
        let config = AppConfig::from_lookup(lookup(&[("APOTHECA_DB_PATH", ":memory:")])).unwrap();
        assert!(config.db_config().is_in_memory());
    }
}
