//! Configuration structures.
//!
//! Configuration is loaded from a JSON file and environment variables; every
//! section falls back to its defaults when absent.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::Result;

/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "LISTENER_LOG_LEVEL";

/// Environment variable selecting the log format (`json` or anything else for compact).
pub const ENV_LOG_FORMAT: &str = "LISTENER_LOG_FORMAT";

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Subscription bridge behaviour.
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Config {
    /// Parse configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Apply `LISTENER_LOG_LEVEL` / `LISTENER_LOG_FORMAT` overrides.
    pub fn apply_env(mut self) -> Self {
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            if !level.is_empty() {
                self.observability.log_level = level;
            }
        }
        if let Ok(format) = std::env::var(ENV_LOG_FORMAT) {
            self.observability.json_logs = format.eq_ignore_ascii_case("json");
        }
        self
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Subscription bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Drop deferred default data that settles after the bridge was deactivated.
    pub suppress_after_deactivate: bool,

    /// Release all subscriptions when the bridge is dropped.
    pub release_on_drop: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            suppress_after_deactivate: true,
            release_on_drop: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
        assert!(config.bridge.suppress_after_deactivate);
        assert!(config.bridge.release_on_drop);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            Config::from_json_str(r#"{"bridge": {"suppress_after_deactivate": false}}"#).unwrap();
        assert!(!config.bridge.suppress_after_deactivate);
        assert!(config.bridge.release_on_drop);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"observability": {{"log_level": "debug", "json_logs": true}}}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logs);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(crate::types::Error::Io(_))));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let result = Config::from_json_str("{not json");
        assert!(matches!(result, Err(crate::types::Error::Serialization(_))));
    }
}
