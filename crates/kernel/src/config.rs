//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, ensure};

use crate::menu::{FilterPolicy, MenuSource, NavigationOptions};

/// Longest accepted navigation cache TTL (one year).
pub const MAX_NAVIGATION_CACHE_TTL_SECS: u64 = 86_400 * 365;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. Required by `serve` only.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// TTL for cached user contexts and menus (default: 300 seconds).
    pub navigation_cache_ttl: Duration,

    /// Optional YAML/JSON file replacing the built-in menus.
    pub navigation_menu_file: Option<PathBuf>,

    /// Drop a failing menu item's whole subtree (default: true).
    pub prune_on_parent_failure: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = lookup("DATABASE_URL");

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let ttl_secs: u64 = var("NAVIGATION_CACHE_TTL_SECS", "300")
            .parse()
            .context("NAVIGATION_CACHE_TTL_SECS must be a valid u64")?;
        ensure!(
            ttl_secs <= MAX_NAVIGATION_CACHE_TTL_SECS,
            "NAVIGATION_CACHE_TTL_SECS must be at most {MAX_NAVIGATION_CACHE_TTL_SECS} (got {ttl_secs})"
        );

        let navigation_menu_file = lookup("NAVIGATION_MENU_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let prune_on_parent_failure = var("NAVIGATION_PRUNE_ON_PARENT_FAILURE", "true")
            .to_lowercase()
            .parse()
            .context("NAVIGATION_PRUNE_ON_PARENT_FAILURE must be true or false")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            navigation_cache_ttl: Duration::from_secs(ttl_secs),
            navigation_menu_file,
            prune_on_parent_failure,
        })
    }

    /// The database URL, or an error naming the missing variable.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL environment variable is required")
    }

    /// Menu source selected by `NAVIGATION_MENU_FILE`.
    pub fn menu_source(&self) -> MenuSource {
        match &self.navigation_menu_file {
            Some(path) => MenuSource::File(path.clone()),
            None => MenuSource::Builtin,
        }
    }

    /// Options for navigation providers built from this configuration.
    pub fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions {
            ttl: self.navigation_cache_ttl,
            policy: FilterPolicy {
                prune_on_parent_failure: self.prune_on_parent_failure,
            },
            source: self.menu_source(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.navigation_cache_ttl, Duration::from_secs(300));
        assert!(config.prune_on_parent_failure);
        assert!(config.database_url.is_none());
        assert!(config.require_database_url().is_err());
        assert!(matches!(config.menu_source(), MenuSource::Builtin));
    }

    #[test]
    fn navigation_settings_are_read() {
        let config = load(&[
            ("NAVIGATION_CACHE_TTL_SECS", "60"),
            ("NAVIGATION_MENU_FILE", "/etc/portline/menu.yaml"),
            ("NAVIGATION_PRUNE_ON_PARENT_FAILURE", "FALSE"),
        ])
        .unwrap();

        let options = config.navigation_options();
        assert_eq!(options.ttl, Duration::from_secs(60));
        assert!(!options.policy.prune_on_parent_failure);
        assert!(matches!(
            options.source,
            MenuSource::File(ref path) if path == &PathBuf::from("/etc/portline/menu.yaml")
        ));
    }

    #[test]
    fn blank_menu_file_means_builtin() {
        let config = load(&[("NAVIGATION_MENU_FILE", "  ")]).unwrap();
        assert!(config.navigation_menu_file.is_none());
    }

    #[test]
    fn ttl_longer_than_a_year_is_rejected() {
        let err = load(&[("NAVIGATION_CACHE_TTL_SECS", "40000000000")]).unwrap_err();
        assert!(err.to_string().contains("at most"));

        let max = MAX_NAVIGATION_CACHE_TTL_SECS.to_string();
        assert!(load(&[("NAVIGATION_CACHE_TTL_SECS", max.as_str())]).is_ok());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("NAVIGATION_CACHE_TTL_SECS", "-5")]).is_err());
        assert!(load(&[("NAVIGATION_PRUNE_ON_PARENT_FAILURE", "maybe")]).is_err());
    }
}
