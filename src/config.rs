//! Host configuration
//!
//! A JSON file (default `./taxakey.json`). Every field has a default, and a
//! missing file means all defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::{CliError, CliResult};
use crate::engine::EngineOptions;
use crate::observability::{log_event_with_fields, Event};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one file per stored session
    #[serde(default = "default_session_dir")]
    pub session_dir: String,

    /// Mode for keys that carry none: 1 = all characters, 2 = relevant only
    #[serde(default = "default_key_mode")]
    pub default_key_mode: u8,

    /// Clear conflicts owed only to several states being true at once
    #[serde(default)]
    pub allow_multistate: bool,

    /// Fail loading on dangling statements instead of dropping them
    #[serde(default = "default_strict_references")]
    pub strict_references: bool,

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_session_dir() -> String {
    "./sessions".to_string()
}
fn default_key_mode() -> u8 {
    1
}
fn default_strict_references() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            default_key_mode: default_key_mode(),
            allow_multistate: false,
            strict_references: default_strict_references(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file, or defaults if there is none
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> CliResult<()> {
        if self.session_dir.trim().is_empty() {
            return Err(CliError::config_error("session_dir must not be empty"));
        }

        if !matches!(self.default_key_mode, 1 | 2) {
            return Err(CliError::config_error(format!(
                "Invalid default_key_mode: {}. Must be 1 or 2.",
                self.default_key_mode
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of {}.",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn session_path(&self) -> &Path {
        Path::new(&self.session_dir)
    }

    /// The engine switches this configuration selects
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            allow_multistate: self.allow_multistate,
            strict_references: self.strict_references,
        }
    }

    /// Records the effective configuration once logging is up
    pub fn log_loaded(&self) {
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("session_dir", &self.session_dir),
                ("default_key_mode", &self.default_key_mode.to_string()),
                ("allow_multistate", &self.allow_multistate.to_string()),
                ("strict_references", &self.strict_references.to_string()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session_dir, "./sessions");
        assert_eq!(config.default_key_mode, 1);
        assert!(!config.allow_multistate);
        assert!(config.strict_references);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_and_project_options() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taxakey.json");
        fs::write(&path, r#"{"allow_multistate": true, "strict_references": false, "default_key_mode": 2}"#)
            .unwrap();
        let config = Config::load(&path).unwrap();
        let options = config.engine_options();
        assert!(options.allow_multistate);
        assert!(!options.strict_references);
        assert_eq!(config.default_key_mode, 2);
    }

    #[test]
    fn test_validation_failures() {
        let bad_mode = Config { default_key_mode: 3, ..Config::default() };
        assert!(bad_mode.validate().is_err());

        let bad_dir = Config { session_dir: " ".into(), ..Config::default() };
        assert!(bad_dir.validate().is_err());

        let bad_level = Config { log_level: "loud".into(), ..Config::default() };
        let err = bad_level.validate().unwrap_err();
        assert_eq!(err.code_str(), "TAXAKEY_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taxakey.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load(&path).unwrap_err().code_str(), "TAXAKEY_CLI_CONFIG_ERROR");
    }
}
