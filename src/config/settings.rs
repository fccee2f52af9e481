use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;

use crate::config::paths::{app_data_dir, default_config_path};
use crate::error::OrbitError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
    /// Keep only this many most recent week keys in weekly aggregates
    pub retention_weeks: Option<u32>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        OrbitConfig {
            data_dir: None,
            log_level: "info".to_string(),
            log_json: false,
            retention_weeks: None,
        }
    }
}

impl OrbitConfig {
    /// Directory the file store writes records into.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(app_data_dir)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, OrbitError> {
        let config = toml::from_str::<OrbitConfig>(content)?;
        Ok(config)
    }
}

/// Load configuration from an explicit path.
/// A missing file yields defaults; a file that does not parse is an error.
pub fn load_config_from(path: &Path) -> Result<OrbitConfig, OrbitError> {
    match fs::read_to_string(path) {
        Ok(content) => OrbitConfig::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("path: {:?}", path))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(OrbitConfig::default()),
        Err(e) => Err(OrbitError::new(
            format!("Failed to read config: {}", e),
            "config"
        ).with_context(format!("path: {:?}", path))),
    }
}

lazy_static! {
    static ref ORBIT_CONFIG: Result<OrbitConfig, OrbitError> = load_config_from(&default_config_path());
}

/// Get the cached process-wide configuration from the default `orbit.toml`
/// (loaded once on first use). A file that does not parse stays an error
/// on every call.
pub fn get_config() -> Result<&'static OrbitConfig, OrbitError> {
    ORBIT_CONFIG.as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = OrbitConfig::from_toml_str("").unwrap();
        assert_eq!(config, OrbitConfig::default());
        assert_eq!(config.log_level, "info");
        assert!(config.retention_weeks.is_none());
    }

    #[test]
    fn test_partial_toml_overrides_fields() {
        let config = OrbitConfig::from_toml_str(
            "retention_weeks = 12\nlog_json = true\ndata_dir = \"/tmp/orbit\"\n",
        )
        .unwrap();
        assert_eq!(config.retention_weeks, Some(12));
        assert!(config.log_json);
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/orbit"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = OrbitConfig::from_toml_str("retention_weeks = \"many\"").unwrap_err();
        assert_eq!(err.stage, "config");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, OrbitConfig::default());
    }
}
