use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::constants::{COL_TYPE, WELL_KNOWN_COLUMNS};
use crate::domain::{ContentType, RawDataset, RawRecord};
use crate::error::{CatalogError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::parser::classify_content_type;

static COLUMN_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-]+").expect("column separator regex is valid"));

/// A dataset with canonical column names and trimmed values, plus notes about
/// what had to be adjusted to get there
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDataset {
    pub dataset: RawDataset,
    pub report: NormalizationReport,
}

/// Structural observations made while normalizing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationReport {
    /// (raw name, canonical name) for every column whose name changed
    pub renamed_columns: Vec<(String, String)>,
    /// Canonical names produced by more than one raw column; the later column wins
    pub duplicate_columns: Vec<String>,
    /// Well-known columns absent from the input
    pub missing_columns: Vec<String>,
}

/// Trait for turning a raw dataset into its canonical shape
pub trait Normalizer {
    fn normalize(&self, dataset: &RawDataset) -> Result<NormalizedDataset>;
}

/// Canonicalize a column header: trimmed, lower-case, separators joined by `_`.
pub fn canonical_column_name(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
    COLUMN_SEPARATORS.replace_all(&trimmed, "_").into_owned()
}

/// Rewrite a raw type label to its canonical form when recognized.
pub fn canonical_type_label(raw: &str) -> String {
    match classify_content_type(raw) {
        ContentType::Unknown => raw.trim().to_string(),
        known => known.label().to_string(),
    }
}

/// Default normalizer used by the pipeline
#[derive(Debug, Default, Clone)]
pub struct DefaultNormalizer;

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self
    }

    fn normalize_record(&self, record: &RawRecord, columns: &[String]) -> RawRecord {
        let mut out = RawRecord::new();

        // Header order decides which duplicate wins; fields outside the header follow.
        let ordered = columns
            .iter()
            .map(String::as_str)
            .filter(|c| record.contains_field(c))
            .map(|c| (c, record.get(c)))
            .chain(
                record
                    .fields()
                    .filter(|(field, _)| !columns.iter().any(|c| c.as_str() == *field)),
            );

        for (field, value) in ordered {
            let name = canonical_column_name(field);
            let value = value.map(|v| {
                if name == COL_TYPE {
                    canonical_type_label(v)
                } else {
                    v.trim().to_string()
                }
            });
            out.insert(name, value);
        }

        out
    }
}

impl Normalizer for DefaultNormalizer {
    #[instrument(skip(self, dataset), fields(columns = dataset.columns.len(), records = dataset.records.len()))]
    fn normalize(&self, dataset: &RawDataset) -> Result<NormalizedDataset> {
        if dataset.columns.is_empty() {
            metrics::load::schema_error();
            return Err(CatalogError::Schema("input has no columns".to_string()));
        }
        if dataset.records.is_empty() {
            metrics::load::schema_error();
            return Err(CatalogError::Schema(format!(
                "input has {} columns but no rows",
                dataset.columns.len()
            )));
        }

        let mut report = NormalizationReport::default();
        let mut columns: Vec<String> = Vec::with_capacity(dataset.columns.len());

        for raw in &dataset.columns {
            let canonical = canonical_column_name(raw);
            if canonical != *raw {
                debug!("Renaming column '{}' -> '{}'", raw, canonical);
                report.renamed_columns.push((raw.clone(), canonical.clone()));
            }
            if columns.contains(&canonical) {
                warn!("Column '{}' appears more than once after canonicalization; later column wins", canonical);
                if !report.duplicate_columns.contains(&canonical) {
                    report.duplicate_columns.push(canonical);
                }
            } else {
                columns.push(canonical);
            }
        }

        for expected in WELL_KNOWN_COLUMNS {
            if !columns.iter().any(|c| c == expected) {
                warn!("Expected column '{}' is missing; its derived fields will be absent", expected);
                metrics::load::missing_column(expected);
                report.missing_columns.push(expected.to_string());
            }
        }

        let records: Vec<RawRecord> = dataset
            .records
            .iter()
            .map(|r| self.normalize_record(r, &dataset.columns))
            .collect();

        metrics::load::records_loaded(records.len());
        metrics::load::columns_seen(columns.len());
        info!("Normalized {} records across {} columns", records.len(), columns.len());

        Ok(NormalizedDataset {
            dataset: RawDataset::new(columns, records),
            report,
        })
    }
}
