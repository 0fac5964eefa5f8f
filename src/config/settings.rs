//! Bridge configuration file handling.
//!
//! Loads timeouts and bus sizing from a JSON file, then applies environment
//! overrides.

use super::xdg::XdgDirs;
use crate::messaging::DEFAULT_BUS_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default wait for a correlated response or for render data.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Environment override for the request timeout.
pub const REQUEST_TIMEOUT_ENV: &str = "UIBRIDGE_REQUEST_TIMEOUT_MS";
/// Environment override for the render-data timeout.
pub const RENDER_DATA_TIMEOUT_ENV: &str = "UIBRIDGE_RENDER_DATA_TIMEOUT_MS";

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Runtime settings for the bus client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// How long `send_request` waits for a response.
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How long `wait_for_render_data` waits for the host's push.
    #[serde(default = "default_timeout_ms")]
    pub render_data_timeout_ms: u64,

    /// Messages a slow inbound listener may fall behind before lagging.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_bus_capacity() -> usize {
    DEFAULT_BUS_CAPACITY
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            render_data_timeout_ms: DEFAULT_TIMEOUT_MS,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn render_data_timeout(&self) -> Duration {
        Duration::from_millis(self.render_data_timeout_ms)
    }

    /// Use the same timeout for requests and render data.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self.render_data_timeout_ms = timeout_ms;
        self
    }

    /// Get the default configuration path.
    pub fn default_config_path() -> PathBuf {
        XdgDirs::new().config_file()
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: BridgeConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "Loaded bridge config");
        Ok(config)
    }

    /// Load from `path` (or the default path), falling back to defaults when
    /// the file is missing, then apply environment overrides.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Self::default(),
            Err(e) => return Err(e),
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply `UIBRIDGE_*` overrides from `lookup`. Unparsable values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ms) = parse_override(&lookup, REQUEST_TIMEOUT_ENV) {
            self.request_timeout_ms = ms;
        }
        if let Some(ms) = parse_override(&lookup, RENDER_DATA_TIMEOUT_ENV) {
            self.render_data_timeout_ms = ms;
        }
        self
    }

}

fn parse_override(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid timeout override");
            None
        }
    }
}
