//! Pipeline configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) gives the stock
//! pipeline:
//!
//! ```toml
//! threshold = 1
//! top_n = 100
//! validation_batch_size = 100
//!
//! [keywords]
//! asset = ["BITCOIN", "GOLD"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::design_filter::DesignKeywords;
use crate::ranking::{DEFAULT_RANKING_BATCH_SIZE, DEFAULT_RANKING_WINDOW_DAYS, DEFAULT_TOP_N};
use crate::validator::{
    DEFAULT_MAX_CONCURRENT_BATCHES, DEFAULT_VALIDATION_BATCH_SIZE, DEFAULT_VALIDATION_WINDOW_DAYS,
};
use crate::ValidationError;

const MAX_WINDOW_DAYS: u32 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Tunables for one candidate-generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum Damerau-Levenshtein distance for a match.
    pub threshold: usize,
    /// Number of most-traded tickers used as targets.
    pub top_n: usize,
    /// Targets shorter than this are rejected before matching.
    pub min_target_len: usize,
    pub ranking_window_days: u32,
    pub ranking_batch_size: usize,
    pub validation_window_days: u32,
    pub validation_batch_size: usize,
    pub max_concurrent_batches: usize,
    /// Drop pairs that are not a single adjacent-key substitution.
    pub keyboard_proximate_only: bool,
    /// Check candidates for recent volume before emitting them.
    pub validate_activity: bool,
    pub keywords: DesignKeywords,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 1,
            top_n: DEFAULT_TOP_N,
            min_target_len: 1,
            ranking_window_days: DEFAULT_RANKING_WINDOW_DAYS,
            ranking_batch_size: DEFAULT_RANKING_BATCH_SIZE,
            validation_window_days: DEFAULT_VALIDATION_WINDOW_DAYS,
            validation_batch_size: DEFAULT_VALIDATION_BATCH_SIZE,
            max_concurrent_batches: DEFAULT_MAX_CONCURRENT_BATCHES,
            keyboard_proximate_only: false,
            validate_activity: true,
            keywords: DesignKeywords::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads, normalizes and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|error| match error {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Defaults when `path` is `None`, the file otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.keywords = config.keywords.normalized();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_zero("threshold", self.threshold)?;
        non_zero("ranking_batch_size", self.ranking_batch_size)?;
        non_zero("validation_batch_size", self.validation_batch_size)?;
        non_zero("max_concurrent_batches", self.max_concurrent_batches)?;
        window("ranking_window_days", self.ranking_window_days)?;
        window("validation_window_days", self.validation_window_days)?;

        if self.keywords.asset.iter().any(|keyword| keyword.trim().is_empty()) {
            return Err(ValidationError::EmptyKeyword { field: "keywords.asset" });
        }
        if self.keywords.fund.iter().any(|keyword| keyword.trim().is_empty()) {
            return Err(ValidationError::EmptyKeyword { field: "keywords.fund" });
        }
        Ok(())
    }
}

fn non_zero(field: &'static str, value: usize) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::ZeroValue { field });
    }
    Ok(())
}

fn window(field: &'static str, value: u32) -> Result<(), ValidationError> {
    if !(1..=MAX_WINDOW_DAYS).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: u64::from(value),
            min: 1,
            max: u64::from(MAX_WINDOW_DAYS),
        });
    }
    Ok(())
}
