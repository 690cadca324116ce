//! Stage metrics for the catalog pipeline
//!
//! Counters and histograms are emitted through the `metrics` facade. Nothing
//! is exported unless the embedding application installs a recorder.

use std::fmt;

/// All metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Load metrics
    LoadRecords,
    LoadColumns,
    LoadMissingColumns,
    LoadSchemaErrors,
    LoadDuration,

    // Enrich metrics
    EnrichRecords,
    EnrichDateParseFailures,
    EnrichDurationParseFailures,
    EnrichDurationMismatches,
    EnrichUnknownContentType,
    EnrichDuration,

    // Aggregate metrics
    AggregateDimensions,
    AggregateBuckets,
    AggregateDuration,

    // Summary metrics
    SummaryBuilt,
    SummaryIncompleteMetrics,

    // Run metrics
    PipelineRuns,
    PipelineDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricName::LoadRecords => "catalog_load_records_total",
            MetricName::LoadColumns => "catalog_load_columns",
            MetricName::LoadMissingColumns => "catalog_load_missing_columns_total",
            MetricName::LoadSchemaErrors => "catalog_load_schema_errors_total",
            MetricName::LoadDuration => "catalog_load_duration_seconds",

            MetricName::EnrichRecords => "catalog_enrich_records_total",
            MetricName::EnrichDateParseFailures => "catalog_enrich_date_parse_failures_total",
            MetricName::EnrichDurationParseFailures => "catalog_enrich_duration_parse_failures_total",
            MetricName::EnrichDurationMismatches => "catalog_enrich_duration_mismatches_total",
            MetricName::EnrichUnknownContentType => "catalog_enrich_unknown_content_type_total",
            MetricName::EnrichDuration => "catalog_enrich_duration_seconds",

            MetricName::AggregateDimensions => "catalog_aggregate_dimensions_total",
            MetricName::AggregateBuckets => "catalog_aggregate_buckets",
            MetricName::AggregateDuration => "catalog_aggregate_duration_seconds",

            MetricName::SummaryBuilt => "catalog_summary_built_total",
            MetricName::SummaryIncompleteMetrics => "catalog_summary_incomplete_metrics_total",

            MetricName::PipelineRuns => "catalog_pipeline_runs_total",
            MetricName::PipelineDuration => "catalog_pipeline_duration_seconds",
        };
        f.write_str(name)
    }
}

impl MetricName {
    pub fn as_str(&self) -> String {
        self.to_string()
    }
}

pub mod load {
    use super::MetricName;

    pub fn records_loaded(count: usize) {
        ::metrics::counter!(MetricName::LoadRecords.as_str()).increment(count as u64);
    }

    pub fn columns_seen(count: usize) {
        ::metrics::histogram!(MetricName::LoadColumns.as_str()).record(count as f64);
    }

    pub fn missing_column(column: &str) {
        ::metrics::counter!(MetricName::LoadMissingColumns.as_str(), "column" => column.to_string())
            .increment(1);
    }

    pub fn schema_error() {
        ::metrics::counter!(MetricName::LoadSchemaErrors.as_str()).increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::LoadDuration.as_str()).record(secs);
    }
}

pub mod enrich {
    use super::MetricName;

    pub fn records_enriched(count: usize) {
        ::metrics::counter!(MetricName::EnrichRecords.as_str()).increment(count as u64);
    }

    pub fn date_parse_failure() {
        ::metrics::counter!(MetricName::EnrichDateParseFailures.as_str()).increment(1);
    }

    pub fn duration_parse_failure() {
        ::metrics::counter!(MetricName::EnrichDurationParseFailures.as_str()).increment(1);
    }

    pub fn duration_mismatch(content_type: &str) {
        ::metrics::counter!(
            MetricName::EnrichDurationMismatches.as_str(),
            "content_type" => content_type.to_string()
        )
        .increment(1);
    }

    pub fn unknown_content_type() {
        ::metrics::counter!(MetricName::EnrichUnknownContentType.as_str()).increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::EnrichDuration.as_str()).record(secs);
    }
}

pub mod aggregate {
    use super::MetricName;

    pub fn dimension_computed(dimension: &str, buckets: usize) {
        ::metrics::counter!(MetricName::AggregateDimensions.as_str(), "dimension" => dimension.to_string())
            .increment(1);
        ::metrics::histogram!(MetricName::AggregateBuckets.as_str(), "dimension" => dimension.to_string())
            .record(buckets as f64);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::AggregateDuration.as_str()).record(secs);
    }
}

pub mod summary {
    use super::MetricName;

    pub fn built() {
        ::metrics::counter!(MetricName::SummaryBuilt.as_str()).increment(1);
    }

    pub fn incomplete_metrics(count: usize) {
        ::metrics::counter!(MetricName::SummaryIncompleteMetrics.as_str()).increment(count as u64);
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn run_completed(secs: f64) {
        ::metrics::counter!(MetricName::PipelineRuns.as_str()).increment(1);
        ::metrics::histogram!(MetricName::PipelineDuration.as_str()).record(secs);
    }
}
