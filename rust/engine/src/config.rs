//! Engine configuration.
//!
//! Every field has a default, so an empty YAML document is a valid configuration:
//!
//! ```yaml
//! mid_height: 7
//! fin_height: 14
//! weights_dir: wei
//! book_path: book/book.txt
//! ```

use std::path::{Path, PathBuf};

use othello_board::MAX_PLY;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::SearchLimits;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Midgame alpha-beta search height.
    #[serde(default = "default_mid_height")]
    pub mid_height: u32,
    /// Endgame search starts once at most this many plies remain.
    #[serde(default = "default_fin_height")]
    pub fin_height: u32,
    /// Midgame nodes at least this high reorder children by one-ply evaluation.
    #[serde(default = "default_order_min_height")]
    pub order_min_height: u32,
    /// Endgame nodes at least this high use negascout; lower nodes use plain alpha-beta.
    #[serde(default = "default_scout_min_height")]
    pub scout_min_height: u32,
    /// Directory holding `w0.txt` .. `w14.txt`. Without it the evaluator starts from zero weights.
    #[serde(default)]
    pub weights_dir: Option<PathBuf>,
    /// Opening book text file. Without it the engine searches from the first move.
    #[serde(default)]
    pub book_path: Option<PathBuf>,
}

fn default_mid_height() -> u32 {
    7
}

fn default_fin_height() -> u32 {
    14
}

fn default_order_min_height() -> u32 {
    3
}

fn default_scout_min_height() -> u32 {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mid_height: default_mid_height(),
            fin_height: default_fin_height(),
            order_min_height: default_order_min_height(),
            scout_min_height: default_scout_min_height(),
            weights_dir: None,
            book_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        let config: EngineConfig = if yaml.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mid_height == 0 {
            return Err(ConfigError::Invalid("mid_height must be at least 1".into()));
        }
        if self.fin_height > MAX_PLY {
            return Err(ConfigError::Invalid(format!(
                "fin_height {} exceeds the {MAX_PLY} plies of a game",
                self.fin_height
            )));
        }
        Ok(())
    }

    /// First ply searched by the endgame solver.
    pub fn fin_phase(&self) -> u32 {
        MAX_PLY - self.fin_height
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            order_min_height: self.order_min_height,
            scout_min_height: self.scout_min_height,
        }
    }
}
