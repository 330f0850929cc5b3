//! Common configuration and observability for the Rudder crates.
//!
//! This crate holds the pieces every other Rudder crate needs: connection
//! settings for a remote WebDriver endpoint, environment-driven overrides,
//! and the shared `tracing` bootstrap. It is intentionally lightweight and
//! dependency-minimal so that all crates can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`RemoteConfig`]: Endpoint and timeout settings for a WebDriver server
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ConfigError`]: Errors raised while reading configuration
//!
//! # Examples
//!
//! Constructing a default configuration:
//!
//! ```rust
//! use rudder_common::RemoteConfig;
//!
//! let mut cfg = RemoteConfig::default();
//! cfg.request_timeout_secs = 60;
//! assert_eq!(cfg.endpoint, "http://localhost:9515");
//! ```
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod observability;

/// Environment variable naming the WebDriver server URL.
pub const ENV_ENDPOINT: &str = "RUDDER_WEBDRIVER_URL";
/// Environment variable overriding the connect timeout, in seconds.
pub const ENV_CONNECT_TIMEOUT: &str = "RUDDER_CONNECT_TIMEOUT_SECS";
/// Environment variable overriding the per-request timeout, in seconds.
pub const ENV_REQUEST_TIMEOUT: &str = "RUDDER_REQUEST_TIMEOUT_SECS";
/// Environment variable pointing at a directory of atom scripts on disk.
pub const ENV_ATOM_DIR: &str = "RUDDER_ATOM_DIR";

/// Connection settings for a remote WebDriver server.
///
/// The defaults target a locally running chromedriver. Values can be
/// overridden per field or read wholesale from the environment with
/// [`RemoteConfig::from_env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the WebDriver server, e.g. `http://localhost:9515` or a
    /// Selenium Grid hub such as `http://grid:4444/wd/hub`.
    pub endpoint: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Deadline for a single command round trip in seconds. Long-running
    /// commands (`executeAsyncScript`, `newSession` against a cold grid)
    /// may need this raised.
    pub request_timeout_secs: u64,
    /// Directory to load browser atom scripts from instead of the copies
    /// bundled into the binary. `None` means use the bundled copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_dir: Option<PathBuf>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            atom_dir: None,
        }
    }
}

impl RemoteConfig {
    /// Build a configuration from the `RUDDER_*` environment variables,
    /// falling back to [`RemoteConfig::default`] for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            cfg.endpoint = endpoint;
        }
        if let Some(secs) = read_secs(ENV_CONNECT_TIMEOUT)? {
            cfg.connect_timeout_secs = secs;
        }
        if let Some(secs) = read_secs(ENV_REQUEST_TIMEOUT)? {
            cfg.request_timeout_secs = secs;
        }
        if let Ok(dir) = std::env::var(ENV_ATOM_DIR) {
            cfg.atom_dir = Some(PathBuf::from(dir));
        }
        tracing::debug!(
            endpoint = %cfg.endpoint,
            connect_timeout_secs = cfg.connect_timeout_secs,
            request_timeout_secs = cfg.request_timeout_secs,
            "config.resolved"
        );
        Ok(cfg)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn read_secs(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidVar {
                var,
                value: raw,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Errors raised while reading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: {value:?}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
}
