//! Configuration
//!
//! An optional TOML file tunes the labels of synthesized tree nodes, the
//! nesting limit and where the keyword description table lives:
//!
//! ```toml
//! descriptions = "descriptions.json"   # relative to this file
//! max-depth = 64
//!
//! [labels]
//! transaction = "Total transaction time"
//! front-side = "Front side (client-facing) processing"
//! back-side = "Back side (server-facing) processing"
//! processing-rule = "Processing rule execution"
//! ```

pub mod path;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::latency::{DEFAULT_MAX_DEPTH, Descriptions, MAX_DEPTH_LIMIT};
pub use path::{ConfigLocation, config_location, descriptions_path};

/// Descriptions given to synthesized tree nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Labels {
    pub transaction: String,
    pub front_side: String,
    pub back_side: String,
    pub processing_rule: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            transaction: "Total transaction time".to_string(),
            front_side: "Front side (client-facing) processing".to_string(),
            back_side: "Back side (server-facing) processing".to_string(),
            processing_rule: "Processing rule execution".to_string(),
        }
    }
}

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LatencyConfig {
    /// Description table (JSON object of keyword to text)
    pub descriptions: Option<PathBuf>,
    /// Deepest processing rule nesting accepted before parsing fails
    pub max_depth: usize,
    pub labels: Labels,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            descriptions: None,
            max_depth: DEFAULT_MAX_DEPTH,
            labels: Labels::default(),
        }
    }
}

impl LatencyConfig {
    /// Parse config from TOML text.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if config.max_depth == 0 {
            bail!("max-depth must be at least 1");
        }
        if config.max_depth > MAX_DEPTH_LIMIT {
            bail!(
                "max-depth must be at most {MAX_DEPTH_LIMIT}, got {}",
                config.max_depth
            );
        }
        Ok(config)
    }

    /// Load config from a file. A relative `descriptions` path is resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let (Some(descriptions), Some(dir)) = (config.descriptions.as_mut(), path.parent())
            && descriptions.is_relative()
        {
            *descriptions = dir.join(&*descriptions);
        }
        Ok(config)
    }

    /// Load config from the resolved location, falling back to defaults when
    /// no file is configured and the platform default does not exist.
    pub fn resolve(cli: Option<&Path>) -> anyhow::Result<Self> {
        match config_location(cli) {
            Some(ConfigLocation::Explicit(path)) => {
                log::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            Some(ConfigLocation::Default(path)) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load the description table this config points at.
    ///
    /// A `--descriptions` flag wins over everything; with nothing configured the
    /// built-in table is used.
    pub fn load_descriptions(&self, cli: Option<&Path>) -> anyhow::Result<Descriptions> {
        match descriptions_path(cli, self.descriptions.as_deref()) {
            Some(path) => Descriptions::load(&path),
            None => {
                log::debug!("Using built-in keyword descriptions");
                Ok(Descriptions::builtin())
            }
        }
    }
}
