//! Session configuration: sketch dimensions, input file, query list
//!
//! Loaded from YAML (`.yaml`/`.yml`) or JSON (anything else).

use crate::adapter::DEFAULT_BATCH_SIZE;
use crate::query::QueryPair;
use crate::sketch::{SketchConfig, SketchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading a session file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid sketch dimensions: {0}")]
    Sketch(#[from] SketchError),

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("file_path is empty")]
    MissingFilePath,
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_poll_interval_ms() -> u64 {
    2000
}

/// One streaming session: what to build, what to read, what to ask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(flatten)]
    pub sketch: SketchConfig,
    /// Edge-list file to ingest
    pub file_path: PathBuf,
    /// Pairs polled on every interval
    #[serde(default)]
    pub queries: Vec<QueryPair>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Key for the default hash and rank strategies
    #[serde(default)]
    pub seed: u64,
}

impl SessionConfig {
    /// Load and validate a session file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.sketch.validate()?;
        if self.batch_size == 0 {
            return Err(ConfigError::NotPositive("batch_size"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::NotPositive("poll_interval_ms"));
        }
        if self.file_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingFilePath);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
