//! Configuration management for Atlas.
//!
//! Handles loading configuration from TOML files, with the data service
//! address overridable from the command line or the environment.

use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default address of the data service.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";

/// Main configuration structure for Atlas.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Data service settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Data service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the data service.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds. Requests never time out when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: None,
        }
    }
}

impl GatewayConfig {
    /// Creates a gateway config for the given URL with no timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: None,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Parses and validates the base URL.
    pub fn parsed_url(&self) -> Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| AtlasError::config(format!("Invalid gateway URL '{}': {e}", self.url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AtlasError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        if url.cannot_be_a_base() {
            return Err(AtlasError::config(format!(
                "Gateway URL '{}' cannot be used as a base URL",
                self.url
            )));
        }

        Ok(url)
    }

    /// Returns a display string for the header bar.
    pub fn display_string(&self) -> String {
        match self.parsed_url() {
            Ok(url) => {
                let host = url.host_str().unwrap_or("unknown");
                match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                }
            }
            Err(_) => self.url.clone(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-atlas")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AtlasError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AtlasError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolves the gateway settings, with overrides taking precedence.
    ///
    /// `url` carries the command-line flag or the `ATLAS_GATEWAY_URL`
    /// environment variable, whichever clap resolved.
    pub fn resolve_gateway(&self, url: Option<&str>, timeout_secs: Option<u64>) -> Result<GatewayConfig> {
        let mut gateway = self.gateway.clone();
        if let Some(url) = url {
            gateway.url = url.to_string();
        }
        if timeout_secs.is_some() {
            gateway.timeout_secs = timeout_secs;
        }

        gateway.parsed_url()?;
        Ok(gateway)
    }
}
