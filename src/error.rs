use thiserror::Error;

use crate::pipeline::processing::summary::SummaryTable;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Raised by the summary builder when one or more metrics had no data to
/// report. The table is still complete: missing values hold the "N/A"
/// sentinel, so callers can persist it or abort.
#[derive(Error, Debug, Clone)]
#[error("Incomplete data for summary metrics: {}", .missing.join(", "))]
pub struct IncompleteDataError {
    pub partial: SummaryTable,
    pub missing: Vec<String>,
}

impl IncompleteDataError {
    /// Accept the partial table, discarding the error.
    pub fn into_partial(self) -> SummaryTable {
        self.partial
    }
}
