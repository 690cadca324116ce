use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::domain::EnrichedRecord;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::ingestion::RecordSource;
use crate::pipeline::processing::aggregate::{Aggregator, CatalogAggregates};
use crate::pipeline::processing::enrich::{enrich_all, DefaultEnricher, Enricher};
use crate::pipeline::processing::normalize::{DefaultNormalizer, NormalizationReport, Normalizer};
use crate::pipeline::processing::summary::{build_summary, SummaryTable};
use crate::pipeline::storage::{build_charts, OutputWriter, RunManifest};

/// Records after loading, normalization and enrichment
#[derive(Debug, Clone, Serialize)]
pub struct CleanedCatalog {
    pub input: String,
    /// Checksum of the bytes the records were parsed from
    pub input_sha256: Option<String>,
    pub report: NormalizationReport,
    pub records: Vec<EnrichedRecord>,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub input: String,
    pub input_sha256: Option<String>,
    pub report: NormalizationReport,
    pub records: Vec<EnrichedRecord>,
    pub aggregates: CatalogAggregates,
    /// Always the full table; metrics without data hold "N/A"
    pub summary: SummaryTable,
    /// Metrics that had no data to report
    pub incomplete: Vec<String>,
    pub elapsed_seconds: f64,
}

impl PipelineResult {
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }

    pub fn manifest(&self, outputs: Vec<String>) -> RunManifest {
        RunManifest {
            run_id: self.run_id,
            started_at: self.started_at,
            input: self.input.clone(),
            input_sha256: self.input_sha256.clone(),
            record_count: self.records.len(),
            elapsed_seconds: self.elapsed_seconds,
            incomplete_metrics: self.incomplete.clone(),
            outputs,
        }
    }

    /// Write every artifact of the run, manifest last
    pub fn persist(&self, writer: &OutputWriter) -> Result<Vec<PathBuf>> {
        let mut written = vec![
            writer.write_summary(&self.summary)?,
            writer.write_cleaned(&self.records)?,
        ];
        written.extend(writer.write_aggregates(&self.aggregates)?);
        written.push(writer.write_charts(&build_charts(&self.aggregates))?);

        let outputs = written.iter().map(|p| writer.relative(p)).collect();
        written.push(writer.write_manifest(&self.manifest(outputs))?);
        Ok(written)
    }
}

/// Batch pipeline: load, normalize, enrich, aggregate, summarize
pub struct Pipeline {
    config: AnalysisConfig,
    normalizer: Box<dyn Normalizer>,
    enricher: Box<dyn Enricher>,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        let enricher = DefaultEnricher::from_config(&config);
        Self {
            config,
            normalizer: Box::new(DefaultNormalizer::new()),
            enricher: Box::new(enricher),
        }
    }

    pub fn with_enricher(mut self, enricher: Box<dyn Enricher>) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load, normalize and enrich without aggregating
    pub fn clean(&self, source: &dyn RecordSource) -> Result<CleanedCatalog> {
        let loaded = source.load_with_digest()?;
        let normalized = self.normalizer.normalize(&loaded.dataset)?;
        let records = enrich_all(
            self.enricher.as_ref(),
            &normalized.dataset.records,
            self.config.parallel,
        );

        Ok(CleanedCatalog {
            input: source.location(),
            input_sha256: loaded.sha256,
            report: normalized.report,
            records,
        })
    }

    /// Run the full pipeline over one source.
    ///
    /// Fails only on structurally unusable input or adapter errors; missing
    /// summary metrics are reported in `incomplete` instead.
    pub fn run(&self, source: &dyn RecordSource) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id);
        let _enter = span.enter();

        let started_at = Utc::now();
        let t_pipeline = std::time::Instant::now();
        info!("🚀 Starting catalog pipeline for {}", source.location());

        let cleaned = self.clean(source)?;
        info!("✅ Enriched {} records", cleaned.records.len());

        let aggregates = Aggregator::new(&self.config).aggregate(&cleaned.records);

        let (summary, incomplete) = match build_summary(&aggregates) {
            Ok(table) => (table, Vec::new()),
            Err(e) => {
                warn!("{}", e);
                let missing = e.missing.clone();
                (e.into_partial(), missing)
            }
        };

        let elapsed_seconds = t_pipeline.elapsed().as_secs_f64();
        metrics::pipeline::run_completed(elapsed_seconds);
        info!(
            "🏁 Pipeline finished in {:.3}s ({} incomplete metrics)",
            elapsed_seconds,
            incomplete.len()
        );

        Ok(PipelineResult {
            run_id,
            started_at,
            input: cleaned.input,
            input_sha256: cleaned.input_sha256,
            report: cleaned.report,
            records: cleaned.records,
            aggregates,
            summary,
            incomplete,
            elapsed_seconds,
        })
    }
}
