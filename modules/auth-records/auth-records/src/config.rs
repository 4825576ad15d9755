use std::path::Path;

use serde::{Deserialize, Serialize};
use signature_patch::PatcherConfig;

use crate::logging::LoggingConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the auth-records module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthRecordsConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub patcher: PatcherConfig,
}

impl AuthRecordsConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if the TOML is malformed or fails validation.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty log level or an invalid patcher section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level is empty".into()));
        }
        self.patcher
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthRecordsConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.patcher.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [logging]
            level = "debug"
            json = true

            [patcher]
            delay_ms = 250
            function_name = "verifySignature"
        "#;
        let config = AuthRecordsConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.patcher.delay_ms, 250);
        assert_eq!(config.patcher.function_name, "verifySignature");
        assert_eq!(config.patcher.library_marker, "app-sdk");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AuthRecordsConfig::from_toml_str("").unwrap();
        assert_eq!(config.patcher.delay_ms, 1000);
    }

    #[test]
    fn test_invalid_patcher_section_rejected() {
        let err =
            AuthRecordsConfig::from_toml_str("[patcher]\nlibrary_marker = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuthRecordsConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.patcher.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-records.toml");
        std::fs::write(&path, "[patcher]\nenabled = false\n").unwrap();
        let config = AuthRecordsConfig::load(&path).unwrap();
        assert!(!config.patcher.enabled);
    }
}
