//! Application configuration, read from `config.json` in the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use progresso_progress::{EngineConfig, WeekStart};
use progresso_storage::snapshot::DEFAULT_KEY;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const APP_NAME: &str = "progresso";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Storage key the model snapshot is saved under
    pub store_key: String,
    /// Move fully completed skills to the end of their siblings
    pub sink_completed: bool,
    /// First day of the week for week charts and the calendar grid
    pub week_starts_on: WeekStart,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_key: DEFAULT_KEY.to_string(),
            sink_completed: true,
            week_starts_on: WeekStart::Sunday,
        }
    }
}

impl AppConfig {
    /// Load configuration from `data_dir`.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load(data_dir: &Path) -> Self {
        match Self::try_load(data_dir) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sink_completed: self.sink_completed,
        }
    }
}

/// Platform data directory for Progresso, falling back to `./.progresso`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(".progresso"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load(dir.path()), AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"sink_completed": false, "week_starts_on": "monday"}"#,
        )
        .unwrap();

        let config = AppConfig::load(dir.path());
        assert!(!config.sink_completed);
        assert_eq!(config.week_starts_on, WeekStart::Monday);
        assert_eq!(config.store_key, "ProgressoData");
        assert!(!config.engine_config().sink_completed);
    }

    #[test]
    fn test_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ nope").unwrap();
        assert_eq!(AppConfig::load(dir.path()), AppConfig::default());
    }
}
