//! docsync configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::Branding;
use crate::clock::Clock;
use crate::error::SyncError;
use crate::extract::PlanMarkers;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::patch::Header;

/// Main docsync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project name, used for the ledger and a missing README's title
    pub project: String,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Artifact locations
    pub paths: PathsConfig,

    /// Event payload lookup
    pub event: EventConfig,

    /// Ledger defaults
    pub ledger: LedgerConfig,

    /// README patching
    pub readme: ReadmeConfig,

    /// Planning document markers
    pub planning: PlanMarkers,

    /// Timestamp rendering
    pub clock: ClockConfig,

    /// Regenerated README preamble
    pub branding: Branding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: "Moncchichi BLE Hub".to_string(),
            log_level: None,
            paths: PathsConfig::default(),
            event: EventConfig::default(),
            ledger: LedgerConfig::default(),
            readme: ReadmeConfig::default(),
            planning: PlanMarkers::default(),
            clock: ClockConfig::default(),
            branding: Branding::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .docsync.yml
        let local_config = PathBuf::from(".docsync.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/docsync/docsync.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("docsync").join("docsync.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values that would make a run misbehave
    pub fn validate(&self) -> Result<(), SyncError> {
        self.clock.build()?;
        if self.readme.history_limit == 0 {
            return Err(SyncError::InvalidConfig("readme.history-limit must be at least 1".to_string()));
        }
        if self.readme.status_label.trim().is_empty() {
            return Err(SyncError::InvalidConfig("readme.status-label must not be empty".to_string()));
        }
        // A header caption would end the history section it belongs to
        if Header::parse(&self.readme.history_caption).is_some() {
            return Err(SyncError::InvalidConfig(
                "readme.history-caption must not be a markdown header".to_string(),
            ));
        }
        Ok(())
    }
}

/// Artifact locations, relative to the working directory unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub readme: PathBuf,
    pub ledger: PathBuf,
    pub planning: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            readme: PathBuf::from("README.md"),
            ledger: PathBuf::from("codex-progress.json"),
            planning: PathBuf::from("CONTEXT_ENGINEERING.md"),
        }
    }
}

/// Event payload lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Environment variable naming the payload file
    #[serde(rename = "env-var")]
    pub env_var: String,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            env_var: "GITHUB_EVENT_PATH".to_string(),
        }
    }
}

/// Ledger defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Starting percentage when no ledger exists yet
    #[serde(rename = "default-progress")]
    pub default_progress: i32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { default_progress: 70 }
    }
}

/// README patching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    /// Label that starts the status line
    #[serde(rename = "status-label")]
    pub status_label: String,

    /// Header literal of the history section
    #[serde(rename = "history-header")]
    pub history_header: String,

    /// Caption line under the history header
    #[serde(rename = "history-caption")]
    pub history_caption: String,

    /// Entries kept visible under the history header
    #[serde(rename = "history-limit")]
    pub history_limit: usize,

    /// Clear the history section before each append
    #[serde(rename = "reset-history")]
    pub reset_history: bool,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            status_label: "Total Progress".to_string(),
            history_header: "## 🚧 Issue History".to_string(),
            history_caption: "_Auto-maintained by Codex on each merge._".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            reset_history: false,
        }
    }
}

/// Timestamp rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    #[serde(rename = "utc-offset-hours")]
    pub utc_offset_hours: i32,

    #[serde(rename = "zone-label")]
    pub zone_label: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            zone_label: "SGT".to_string(),
        }
    }
}

impl ClockConfig {
    pub fn build(&self) -> Result<Clock, SyncError> {
        Clock::new(self.utc_offset_hours, self.zone_label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.paths.ledger, PathBuf::from("codex-progress.json"));
        assert_eq!(config.event.env_var, "GITHUB_EVENT_PATH");
        assert_eq!(config.ledger.default_progress, 70);
        assert_eq!(config.readme.history_limit, 10);
        assert_eq!(config.planning.issue_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "project: Widget\nreadme:\n  history-limit: 3\nclock:\n  zone-label: UTC\n  utc-offset-hours: 0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.project, "Widget");
        assert_eq!(config.readme.history_limit, 3);
        assert_eq!(config.readme.status_label, "Total Progress");
        assert_eq!(config.clock.zone_label, "UTC");
        assert_eq!(config.paths.readme, PathBuf::from("README.md"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docsync.yml");
        fs::write(&path, "log-level: debug\npaths:\n  readme: docs/README.md\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.paths.readme, PathBuf::from("docs/README.md"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("debug"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("nope.yml"))).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.readme.history_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.clock.utc_offset_hours = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_header_caption_rejected() {
        let mut config = Config::default();
        config.readme.history_header = "## History".to_string();
        config.readme.history_caption = "## Log".to_string();
        assert!(config.validate().is_err());

        config.readme.history_caption = "#hashtag log".to_string();
        assert!(config.validate().is_ok());
    }
}
