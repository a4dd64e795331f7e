//! Monitor configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`MonitorConfig`]
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the monitor loop, loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Owner of stored readings and medications
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Seconds between snapshot ticks
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Seconds between simulated step updates
    #[serde(default = "default_step_interval")]
    pub step_interval_secs: u64,
    /// Number of recent snapshots kept in memory
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Persist one reading every N ticks
    #[serde(default = "default_persist_every")]
    pub persist_every: u64,
    #[serde(default = "default_step_goal")]
    pub step_goal: u32,
    #[serde(default = "default_exercise_goal")]
    pub exercise_goal_mins: u32,
    /// Stop after this many ticks (runs until stopped when unset)
    #[serde(default)]
    pub max_ticks: Option<u64>,
    /// Seed for the simulated shoe (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Directory for the JSON data files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_user_id() -> String {
    "local".to_string()
}
fn default_tick_interval() -> u64 {
    15
}
fn default_step_interval() -> u64 {
    30
}
fn default_history_window() -> usize {
    5
}
fn default_persist_every() -> u64 {
    1
}
fn default_step_goal() -> u32 {
    10_000
}
fn default_exercise_goal() -> u32 {
    30
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".stride")
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            tick_interval_secs: default_tick_interval(),
            step_interval_secs: default_step_interval(),
            history_window: default_history_window(),
            persist_every: default_persist_every(),
            step_goal: default_step_goal(),
            exercise_goal_mins: default_exercise_goal(),
            max_ticks: None,
            seed: None,
            data_dir: default_data_dir(),
        }
    }
}

impl MonitorConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.step_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "step_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.history_window == 0 {
            return Err(ConfigError::Invalid(
                "history_window must be greater than 0".to_string(),
            ));
        }
        if self.persist_every == 0 {
            return Err(ConfigError::Invalid(
                "persist_every must be greater than 0".to_string(),
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::Invalid("user_id must not be empty".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    #[must_use]
    pub fn step_interval(&self) -> Duration {
        Duration::from_secs(self.step_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.tick_interval_secs, 15);
        assert_eq!(config.history_window, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stride.json");
        std::fs::write(&path, r#"{"user_id": "ana", "tick_interval_secs": 5, "seed": 7}"#)
            .unwrap();

        let config = MonitorConfig::load(&path).unwrap();
        assert_eq!(config.user_id, "ana");
        assert_eq!(config.tick_interval(), Duration::from_secs(5));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.step_goal, 10_000);
        assert_eq!(config.data_dir, PathBuf::from(".stride"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stride.json");
        std::fs::write(&path, r#"{"persist_every": 0}"#).unwrap();
        assert!(matches!(
            MonitorConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            MonitorConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
