//! Configuration management for the ashare-picker client.
//!
//! Configuration lives in a single JSON file at `~/.ashare-picker/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables (PICKER_* prefix)
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `PICKER_API_URL` → api.base_url
//! - `PICKER_API_TIMEOUT_SECS` → api.timeout_secs
//! - `PICKER_LOG_LEVEL` → observability.log_level
//! - `PICKER_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".ashare-picker"),
        |dirs| dirs.home_dir().join(".ashare-picker"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// API Configuration
// ============================================================================

/// Remote screening service endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the screening service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_timeout_secs() -> u64 {
    30
}

// ============================================================================
// Screen Criteria Configuration
// ============================================================================

/// Fixed coarse-screen bands passed through unchanged to the remote service.
///
/// These are configuration constants, not user input: the picker always
/// screens for moderate gainers (3-5%) with a healthy volume ratio (1.5-3)
/// in the mid-cap float range (50-300 亿).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Percent-change lower bound (%)
    #[serde(default = "default_change_min")]
    pub change_min: f64,
    /// Percent-change upper bound (%)
    #[serde(default = "default_change_max")]
    pub change_max: f64,
    /// Volume-ratio lower bound
    #[serde(default = "default_volume_ratio_min")]
    pub volume_ratio_min: f64,
    /// Volume-ratio upper bound
    #[serde(default = "default_volume_ratio_max")]
    pub volume_ratio_max: f64,
    /// Float market-cap lower bound (亿)
    #[serde(default = "default_market_cap_min")]
    pub market_cap_min: f64,
    /// Float market-cap upper bound (亿)
    #[serde(default = "default_market_cap_max")]
    pub market_cap_max: f64,
    /// Maximum number of candidates returned
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            change_min: default_change_min(),
            change_max: default_change_max(),
            volume_ratio_min: default_volume_ratio_min(),
            volume_ratio_max: default_volume_ratio_max(),
            market_cap_min: default_market_cap_min(),
            market_cap_max: default_market_cap_max(),
            limit: default_limit(),
        }
    }
}

fn default_change_min() -> f64 {
    3.0
}

fn default_change_max() -> f64 {
    5.0
}

fn default_volume_ratio_min() -> f64 {
    1.5
}

fn default_volume_ratio_max() -> f64 {
    3.0
}

fn default_market_cap_min() -> f64 {
    50.0
}

fn default_market_cap_max() -> f64 {
    300.0
}

fn default_limit() -> u32 {
    20
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the picker client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote screening service endpoint
    #[serde(default)]
    pub api: ApiConfig,

    /// Coarse-screen bands
    #[serde(default)]
    pub screen: ScreenConfig,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no config file exists. Environment overrides apply last.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    /// Apply PICKER_* environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PICKER_API_URL") {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }

        if let Ok(timeout) = std::env::var("PICKER_API_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.api.timeout_secs = secs;
            }
        }

        if let Ok(level) = std::env::var("PICKER_LOG_LEVEL") {
            if !level.is_empty() {
                self.observability.log_level = level;
            }
        }

        if let Ok(format) = std::env::var("PICKER_LOG_FORMAT") {
            if !format.is_empty() {
                self.observability.log_format = format;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.screen.change_min, 3.0);
        assert_eq!(config.screen.change_max, 5.0);
        assert_eq!(config.screen.volume_ratio_min, 1.5);
        assert_eq!(config.screen.volume_ratio_max, 3.0);
        assert_eq!(config.screen.market_cap_min, 50.0);
        assert_eq!(config.screen.market_cap_max, 300.0);
        assert_eq!(config.screen.limit, 20);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "api": {{ "base_url": "http://screener.internal:9000" }} }}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();

        // Explicit value wins
        assert_eq!(config.api.base_url, "http://screener.internal:9000");
        // Everything else defaulted
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.screen.limit, 20);
    }

    #[test]
    fn test_load_from_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = Config::load_from(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert_eq!(parsed.screen.limit, config.screen.limit);
    }
}
