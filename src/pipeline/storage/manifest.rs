use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provenance record written next to every full run's outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub input: String,
    pub input_sha256: Option<String>,
    pub record_count: usize,
    pub elapsed_seconds: f64,
    /// Summary metrics reported as "N/A"
    pub incomplete_metrics: Vec<String>,
    /// Files written by the run, relative to the output directory
    #[serde(default)]
    pub outputs: Vec<String>,
}
