//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following
//! precedence (highest to lowest):
//! 1. Environment variables (prefix: LISTSYNC_)
//! 2. TOML file (`listsync.toml` in the working directory, or an explicit path)
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::controller::ReconcilePolicy;
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Controller defaults
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            controller: ControllerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent header for outgoing requests
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

/// Default behavior for list controllers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Page size for list fetches
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Quiet period for search debouncing, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How mutations reconcile local list state (patch or refetch)
    #[serde(default)]
    pub reconcile: ReconcilePolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            reconcile: ReconcilePolicy::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u64 {
    20
}

fn default_debounce_ms() -> u64 {
    300
}

impl Config {
    /// Load configuration from `listsync.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("listsync.toml")
    }

    /// Load configuration from a specific file
    ///
    /// Missing files are fine; defaults and environment variables still
    /// apply.
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("LISTSYNC_").split("_"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(config.controller.page_size, 20);
        assert_eq!(config.controller.debounce_ms, 300);
        assert_eq!(config.controller.reconcile, ReconcilePolicy::Patch);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = Config::load_from("/nonexistent/listsync.toml").unwrap();
        assert_eq!(config.controller.page_size, 20);
    }

    #[test]
    fn test_load_from_toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[client]
base_url = "https://api.example.com"
timeout_secs = 5

[controller]
page_size = 10
reconcile = "refetch"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.client.base_url, "https://api.example.com");
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.controller.page_size, 10);
        assert_eq!(config.controller.reconcile, ReconcilePolicy::Refetch);
        // Untouched keys keep their defaults.
        assert_eq!(config.controller.debounce_ms, 300);
    }
}
