//! Tracker configuration - ~/.config/tot-solver/config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::tailer::DEFAULT_MAX_READ_FAILURES;

pub const DEFAULT_CARDS_PATH: &str = "collectible-cards.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Reference card dataset
    pub cards_path: PathBuf,
    /// Zone log to follow when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub max_read_failures: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cards_path: PathBuf::from(DEFAULT_CARDS_PATH),
            log_path: None,
            poll_interval_ms: 100,
            max_read_failures: DEFAULT_MAX_READ_FAILURES,
        }
    }
}

impl TrackerConfig {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tot-solver")
            .join("config.json")
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }
}
