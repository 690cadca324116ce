use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::{DEFAULT_TOP_N, DEFAULT_TOP_RATINGS};
use crate::error::{CatalogError, Result};

/// Bound on a ranked bucket list. Zero or negative configured values mean
/// "return every bucket".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TopN {
    All,
    Limit(usize),
}

impl TopN {
    /// Number of buckets to keep out of `available`. `Limit(0)` keeps all,
    /// same as a non-positive configured value.
    pub fn take(&self, available: usize) -> usize {
        match self {
            TopN::All | TopN::Limit(0) => available,
            TopN::Limit(n) => (*n).min(available),
        }
    }
}

impl From<i64> for TopN {
    fn from(n: i64) -> Self {
        if n <= 0 {
            TopN::All
        } else {
            TopN::Limit(usize::try_from(n).unwrap_or(usize::MAX))
        }
    }
}

impl From<TopN> for i64 {
    fn from(top: TopN) -> Self {
        match top {
            TopN::All => 0,
            TopN::Limit(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

/// Options consumed by the enricher and aggregator. Built once per run and
/// passed by reference into each stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_genres: TopN,
    pub top_countries: TopN,
    pub top_people: TopN,
    pub top_ratings: TopN,
    /// Keep only the first N cast members of each title; 0 keeps all.
    pub cast_limit: usize,
    /// Fan enrichment out across worker threads
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_genres: TopN::from(DEFAULT_TOP_N),
            top_countries: TopN::from(DEFAULT_TOP_N),
            top_people: TopN::from(DEFAULT_TOP_N),
            top_ratings: TopN::from(DEFAULT_TOP_RATINGS),
            cast_limit: 0,
            parallel: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    analysis: AnalysisConfig,
}

impl AnalysisConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.analysis)
    }

    pub fn cast_limit(&self) -> Option<usize> {
        (self.cast_limit > 0).then_some(self.cast_limit)
    }
}
