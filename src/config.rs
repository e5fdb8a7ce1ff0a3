//! Persistent command configuration
//!
//! Stores default iteration counts and export fields in a JSON file at
//! `<config_dir>/timeit/config.json`.

use crate::ExportFlags;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid export field in config: {0}")]
    Field(#[from] timeit_core::CodecError),
}

fn default_iterations() -> u32 {
    10
}

/// Defaults for the `timeit` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeitConfig {
    /// Timed runs per invocation
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Untimed runs before measuring
    #[serde(default)]
    pub warmup: u32,
    /// Derived statistics to print (empty = all)
    #[serde(default)]
    pub fields: Vec<String>,
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Default for TimeitConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            warmup: 0,
            fields: Vec::new(),
            pretty: false,
        }
    }
}

impl TimeitConfig {
    /// Config file path: `<config_dir>/timeit/config.json`
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timeit")
            .join("config.json")
    }

    /// Load config from the default path, falling back to defaults on any error
    pub fn load() -> Self {
        let path = Self::path();
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded config from disk");
                config
            }
            Err(ConfigError::Read { .. }) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from `path`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.export_flags()?;
        Ok(config)
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }

    /// Export flags for the configured field names
    pub fn export_flags(&self) -> Result<ExportFlags, ConfigError> {
        Ok(ExportFlags::from_names(&self.fields)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TimeitConfig::default();
        assert_eq!(config.iterations, 10);
        assert_eq!(config.warmup, 0);
        assert!(config.fields.is_empty());
        assert!(!config.pretty);
        assert_eq!(config.export_flags().unwrap(), ExportFlags::empty());
    }

    #[test]
    fn test_round_trip() {
        let config = TimeitConfig {
            iterations: 50,
            warmup: 3,
            fields: vec!["sample_std_dev".to_string()],
            pretty: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        let loaded: TimeitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.export_flags().unwrap(), ExportFlags::SAMPLE_STD_DEV);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{"warmup": 2}"#;
        let config: TimeitConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.iterations, 10);
        assert_eq!(config.warmup, 2);
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: TimeitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TimeitConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = TimeitConfig {
            iterations: 5,
            fields: vec!["variance".to_string(), "std_dev".to_string()],
            ..TimeitConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = TimeitConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.export_flags().unwrap(),
            ExportFlags::VARIANCE | ExportFlags::STD_DEV
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TimeitConfig::load_from(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_field_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"fields": ["p95"]}"#).unwrap();

        let result = TimeitConfig::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Field(_))));
    }
}
