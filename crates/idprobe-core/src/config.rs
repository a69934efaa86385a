//! Configuration management for idprobe.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Endpoint URLs and provider identifiers
//! are compile-time constants in the engine and are not configurable.

use crate::error::{ConfigError, ConfigResult};
use crate::types::ProbeMode;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/idprobe/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Outbound network settings
    pub network: NetworkConfig,
    /// Probe behavior settings
    pub probe: ProbeConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        let config: Self = if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `IDPROBE_PROXY`: Override the outbound proxy URL
    /// - `IDPROBE_ACCEPT_INVALID_CERTS`: Override TLS certificate validation (true/false)
    /// - `IDPROBE_TIMEOUT_SECS`: Override the request timeout
    /// - `IDPROBE_MODE`: Override the probe mode (office/oauth2/brute)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(proxy) = lookup("IDPROBE_PROXY") {
            let proxy = proxy.trim().to_string();
            tracing::debug!("Override network.proxy from env: {}", proxy);
            self.network.proxy = if proxy.is_empty() { None } else { Some(proxy) };
        }

        if let Some(val) = lookup("IDPROBE_ACCEPT_INVALID_CERTS") {
            if let Ok(accept) = val.parse() {
                self.network.accept_invalid_certs = accept;
                tracing::debug!("Override network.accept_invalid_certs from env: {}", accept);
            }
        }

        if let Some(val) = lookup("IDPROBE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.network.timeout_secs = secs;
                tracing::debug!("Override network.timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("IDPROBE_MODE") {
            match val.parse::<ProbeMode>() {
                Ok(mode) => {
                    self.probe.mode = mode;
                    tracing::debug!("Override probe.mode from env: {}", mode);
                }
                Err(e) => tracing::warn!("Ignoring IDPROBE_MODE: {}", e),
            }
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probe.session_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe.session_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.network.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/idprobe/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "idprobe", "idprobe").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Outbound network settings shared by every probe request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Proxy URL for all requests (`http://`, `https://` or `socks5://`)
    pub proxy: Option<String>,
    /// Accept invalid TLS certificates (needed behind intercepting proxies)
    pub accept_invalid_certs: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Fixed user agent; a random desktop browser agent is used when unset
    pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            accept_invalid_certs: false,
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

/// Probe behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Probe used by enumeration
    pub mode: ProbeMode,
    /// Maximum attempts at scraping a complete set of login-page session tokens
    pub session_attempts: u32,
    /// Check that the identity's domain is a provider tenant before enumerating
    pub validate_tenant: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            mode: ProbeMode::Office,
            session_attempts: 4,
            validate_tenant: true,
        }
    }
}
