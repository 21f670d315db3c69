//! Tool configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{InkstrokeError, InkstrokeResult};

/// Global tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Default replay settings.
    pub replay: ReplayDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default replay parameters, overridable from the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayDefaults {
    /// Pretty-print result lines instead of compact JSONL.
    pub pretty: bool,

    /// Append predicted points after every accepted input.
    pub include_predictions: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "inkstroke_modeler=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl ToolConfig {
    /// Load config from `path`. A missing file yields the defaults; a file
    /// that cannot be read or parsed is an error.
    pub fn try_load(path: &Path) -> InkstrokeResult<Self> {
        match read_json_file(path) {
            Err(InkstrokeError::FileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }
}

/// Read and deserialize a JSON document, mapping a missing file to
/// [`InkstrokeError::FileNotFound`].
pub fn read_json_file<T>(path: &Path) -> InkstrokeResult<T>
where
    T: serde::de::DeserializeOwned,
{
    if !path.exists() {
        return Err(InkstrokeError::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        InkstrokeError::config(format!("Failed to parse {}: {e}", path.display()))
    })
}

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> InkstrokeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json + "\n")?;
    Ok(())
}

/// Standard tool config location: `$XDG_CONFIG_HOME/inkstroke/config.json`.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("inkstroke").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolConfig::try_load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(!config.replay.include_predictions);
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = ToolConfig::default();
        config.logging.level = "debug".to_string();
        config.replay.pretty = true;
        write_json_file(&path, &config).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("}\n"));

        let loaded = ToolConfig::try_load(&path).unwrap();
        assert_eq!(loaded.logging.level, "debug");
        assert!(loaded.replay.pretty);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"replay":{"include_predictions":true}}"#).unwrap();

        let loaded = ToolConfig::try_load(&path).unwrap();
        assert!(loaded.replay.include_predictions);
        assert!(!loaded.replay.pretty);
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ToolConfig::try_load(&path).unwrap_err();
        assert!(matches!(err, InkstrokeError::Config { .. }));
    }

    #[test]
    fn test_read_json_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json_file::<ToolConfig>(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, InkstrokeError::FileNotFound { .. }));
    }
}
