use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::constants::NOT_AVAILABLE;
use crate::domain::ContentType;
use crate::error::IncompleteDataError;
use crate::observability::metrics;
use crate::pipeline::processing::aggregate::{CatalogAggregates, DimensionReport, NumericDistribution};

pub const METRIC_TOTAL_TITLES: &str = "total_titles";
pub const METRIC_MOVIE_COUNT: &str = "movie_count";
pub const METRIC_TV_SHOW_COUNT: &str = "tv_show_count";
pub const METRIC_UNKNOWN_TYPE_COUNT: &str = "unknown_type_count";
pub const METRIC_TOP_GENRE: &str = "top_genre";
pub const METRIC_TOP_COUNTRY: &str = "top_country";
pub const METRIC_TOP_DIRECTOR: &str = "top_director";
pub const METRIC_TOP_ACTOR: &str = "top_actor";
pub const METRIC_MEAN_MOVIE_DURATION: &str = "mean_movie_duration_minutes";
pub const METRIC_MEAN_TV_SEASONS: &str = "mean_tv_seasons";
pub const METRIC_EARLIEST_YEAR_ADDED: &str = "earliest_year_added";
pub const METRIC_LATEST_YEAR_ADDED: &str = "latest_year_added";

/// Metric names in table order. Every summary has exactly these rows.
pub const SUMMARY_METRICS: [&str; 12] = [
    METRIC_TOTAL_TITLES,
    METRIC_MOVIE_COUNT,
    METRIC_TV_SHOW_COUNT,
    METRIC_UNKNOWN_TYPE_COUNT,
    METRIC_TOP_GENRE,
    METRIC_TOP_COUNTRY,
    METRIC_TOP_DIRECTOR,
    METRIC_TOP_ACTOR,
    METRIC_MEAN_MOVIE_DURATION,
    METRIC_MEAN_TV_SEASONS,
    METRIC_EARLIEST_YEAR_ADDED,
    METRIC_LATEST_YEAR_ADDED,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SummaryValue {
    Count(u64),
    Text(String),
    Mean(f64),
    Year(i32),
    NotAvailable,
}

impl SummaryValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, SummaryValue::NotAvailable)
    }
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryValue::Count(n) => write!(f, "{}", n),
            SummaryValue::Text(s) => f.write_str(s),
            SummaryValue::Mean(m) => write!(f, "{:.2}", m),
            SummaryValue::Year(y) => write!(f, "{}", y),
            SummaryValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub metric: String,
    pub value: SummaryValue,
}

/// Ordered (metric, value) rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, metric: &str) -> Option<&SummaryValue> {
        self.rows.iter().find(|r| r.metric == metric).map(|r| &r.value)
    }

    /// Rows rendered as (metric, value) strings
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|r| (r.metric.clone(), r.value.to_string()))
            .collect()
    }

    fn push(&mut self, metric: &str, value: SummaryValue) {
        self.rows.push(SummaryRow {
            metric: metric.to_string(),
            value,
        });
    }
}

fn leader_value(report: &DimensionReport) -> SummaryValue {
    report
        .leader()
        .map(|b| SummaryValue::Text(b.label.clone()))
        .unwrap_or(SummaryValue::NotAvailable)
}

fn mean_value(distribution: &NumericDistribution) -> SummaryValue {
    distribution
        .stats
        .as_ref()
        .map(|s| SummaryValue::Mean(s.mean))
        .unwrap_or(SummaryValue::NotAvailable)
}

/// Assemble the fixed summary table.
///
/// Metrics with no underlying data get the "N/A" sentinel; when any metric is
/// missing the complete table is returned inside `IncompleteDataError` so the
/// caller decides whether to persist it.
pub fn build_summary(aggregates: &CatalogAggregates) -> Result<SummaryTable, IncompleteDataError> {
    let mut table = SummaryTable::default();
    let types = &aggregates.content_types.counts;

    table.push(METRIC_TOTAL_TITLES, SummaryValue::Count(aggregates.total_records as u64));
    table.push(METRIC_MOVIE_COUNT, SummaryValue::Count(types.get(ContentType::Movie.label())));
    table.push(METRIC_TV_SHOW_COUNT, SummaryValue::Count(types.get(ContentType::TvShow.label())));
    table.push(
        METRIC_UNKNOWN_TYPE_COUNT,
        SummaryValue::Count(types.get(ContentType::Unknown.label())),
    );
    table.push(METRIC_TOP_GENRE, leader_value(&aggregates.genres));
    table.push(METRIC_TOP_COUNTRY, leader_value(&aggregates.primary_countries));
    table.push(METRIC_TOP_DIRECTOR, leader_value(&aggregates.directors));
    table.push(METRIC_TOP_ACTOR, leader_value(&aggregates.actors));
    table.push(METRIC_MEAN_MOVIE_DURATION, mean_value(&aggregates.movie_durations));
    table.push(METRIC_MEAN_TV_SEASONS, mean_value(&aggregates.tv_seasons));

    let earliest = aggregates.year_trend.first().map(|(year, _)| *year);
    let latest = aggregates.year_trend.last().map(|(year, _)| *year);
    table.push(
        METRIC_EARLIEST_YEAR_ADDED,
        earliest.map(SummaryValue::Year).unwrap_or(SummaryValue::NotAvailable),
    );
    table.push(
        METRIC_LATEST_YEAR_ADDED,
        latest.map(SummaryValue::Year).unwrap_or(SummaryValue::NotAvailable),
    );

    debug_assert_eq!(table.len(), SUMMARY_METRICS.len());
    metrics::summary::built();

    let missing: Vec<String> = table
        .rows()
        .iter()
        .filter(|r| !r.value.is_available())
        .map(|r| r.metric.clone())
        .collect();

    if missing.is_empty() {
        info!("Built summary table with {} metrics", table.len());
        Ok(table)
    } else {
        warn!("Summary metrics without data: {}", missing.join(", "));
        metrics::summary::incomplete_metrics(missing.len());
        Err(IncompleteDataError {
            partial: table,
            missing,
        })
    }
}
