//! Runtime configuration, loadable from YAML
//!
//! Every section falls back to defaults, so an empty file is valid:
//!
//! ```yaml
//! citation:
//!   title_threshold: 0.5
//!   sim_threshold: 0.6
//! paths:
//!   cost_mode: one_minus
//!   node_limit: 200
//! similarity:
//!   extra_stopwords: [survey]
//! ```

use crate::analysis::{CostMode, DEFAULT_EPSILON, DEFAULT_MAX_FLOYD_NODES};
use crate::citation::CitationConfig;
use crate::text::{Normalizer, DEFAULT_EXTRA_ALPHABET};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Path analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub cost_mode: CostMode,
    pub epsilon: f64,
    /// Restrict all-pairs sources to the first N nodes
    pub node_limit: Option<usize>,
    pub max_floyd_nodes: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            cost_mode: CostMode::default(),
            epsilon: DEFAULT_EPSILON,
            node_limit: None,
            max_floyd_nodes: DEFAULT_MAX_FLOYD_NODES,
        }
    }
}

/// Text normalization settings for the similarity ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Letters kept by cleaning besides ASCII alphanumerics
    pub extra_alphabet: String,
    pub keep_hyphens: bool,
    /// Added to the bilingual stopword list
    pub extra_stopwords: Vec<String>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            extra_alphabet: DEFAULT_EXTRA_ALPHABET.to_string(),
            keep_hyphens: false,
            extra_stopwords: Vec::new(),
        }
    }
}

impl SimilarityConfig {
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new()
            .with_alphabet(&self.extra_alphabet)
            .keep_hyphens(self.keep_hyphens)
            .with_stopwords(&self.extra_stopwords)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub citation: CitationConfig,
    pub paths: PathConfig,
    pub similarity: SimilarityConfig,
}

impl Config {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        // serde_yaml reads an empty document as null
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.citation.validate()?;
        if !self.paths.epsilon.is_finite() || self.paths.epsilon <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "paths.epsilon must be a positive number, got {}",
                self.paths.epsilon
            )));
        }
        Ok(())
    }
}
