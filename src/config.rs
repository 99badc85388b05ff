//! Dashboard Configuration Module
//! Column schema constants and the optional JSON configuration file.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "COVID_INSIGHT_CONFIG";
/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "covid_insight.json";
/// Day/month/year, as published in the line-list.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Column headers of the published line-list.
pub mod columns {
    pub const PATIENT_NUMBER: &str = "Patient Number";
    pub const DATE_ANNOUNCED: &str = "Date Announced";
    pub const DETECTED_STATE: &str = "Detected State";
    pub const AGE_BRACKET: &str = "Age Bracket";
    pub const GENDER: &str = "Gender";
    pub const TYPE_OF_TRANSMISSION: &str = "Type of transmission";
    pub const CURRENT_STATUS: &str = "Current Status";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Column names the loader expects in the input table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    pub patient_id: String,
    pub date_announced: String,
    pub detected_state: String,
    pub age_bracket: String,
    pub gender: String,
    pub transmission: String,
    pub current_status: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            patient_id: columns::PATIENT_NUMBER.to_string(),
            date_announced: columns::DATE_ANNOUNCED.to_string(),
            detected_state: columns::DETECTED_STATE.to_string(),
            age_bracket: columns::AGE_BRACKET.to_string(),
            gender: columns::GENDER.to_string(),
            transmission: columns::TYPE_OF_TRANSMISSION.to_string(),
            current_status: columns::CURRENT_STATUS.to_string(),
        }
    }
}

impl ColumnSchema {
    /// All expected column names, in table order.
    pub fn names(&self) -> [&str; 7] {
        [
            self.patient_id.as_str(),
            self.date_announced.as_str(),
            self.detected_state.as_str(),
            self.age_bracket.as_str(),
            self.gender.as_str(),
            self.transmission.as_str(),
            self.current_status.as_str(),
        ]
    }
}

/// What to do with a record whose announcement date cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// Abort the load.
    #[default]
    Strict,
    /// Keep the record but leave it out of the date-based views.
    Skip,
}

/// Runtime configuration for loading and exporting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub columns: ColumnSchema,
    pub date_format: String,
    pub date_policy: DatePolicy,
    /// CSV loaded at startup, if any.
    pub data_path: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns: ColumnSchema::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_policy: DatePolicy::default(),
            data_path: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Resolve the configuration: explicit env file, then the working
    /// directory file, then defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            tracing::info!("loading config from {}", path.display());
            return Self::from_file(&path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            tracing::info!("loading config from {}", local.display());
            return Self::from_file(local);
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.columns.patient_id, "Patient Number");
        assert_eq!(cfg.date_policy, DatePolicy::Strict);
    }

    #[test]
    fn partial_column_override_keeps_other_defaults() {
        let cfg = DashboardConfig::from_json(
            r#"{"columns": {"gender": "Sex"}, "date_policy": "skip"}"#,
        )
        .unwrap();
        assert_eq!(cfg.columns.gender, "Sex");
        assert_eq!(cfg.columns.detected_state, "Detected State");
        assert_eq!(cfg.date_policy, DatePolicy::Skip);
        assert_eq!(cfg.date_format, "%d/%m/%Y");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DashboardConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
