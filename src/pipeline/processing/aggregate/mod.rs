//! Group-by counts and numeric distributions over enriched records.
//!
//! Every ranked list uses the same contract: descending count, ties broken by
//! ascending label (byte-wise), truncated to the configured bound.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, instrument};

use crate::config::{AnalysisConfig, TopN};
use crate::constants::UNKNOWN;
use crate::domain::EnrichedRecord;
use crate::observability::metrics;

/// Reporting dimensions with a categorical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ContentType,
    Genre,
    Country,
    PrimaryCountry,
    Director,
    Actor,
    Rating,
    YearAdded,
    ReleaseYear,
}

impl Dimension {
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::ContentType => "content_type",
            Dimension::Genre => "genre",
            Dimension::Country => "country",
            Dimension::PrimaryCountry => "primary_country",
            Dimension::Director => "director",
            Dimension::Actor => "actor",
            Dimension::Rating => "rating",
            Dimension::YearAdded => "year_added",
            Dimension::ReleaseYear => "release_year",
        }
    }

    /// Whether one record may contribute to several buckets
    pub fn is_exploded(&self) -> bool {
        matches!(
            self,
            Dimension::Genre | Dimension::Country | Dimension::Director | Dimension::Actor
        )
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category label -> count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    counts: BTreeMap<String, u64>,
}

impl AggregateResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Sum over all buckets
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Buckets in ranked order, bounded by `top`.
    pub fn top_n(&self, top: TopN) -> Vec<RankedBucket> {
        let mut ranked: Vec<RankedBucket> = self
            .counts
            .iter()
            .map(|(label, count)| RankedBucket {
                label: label.clone(),
                count: *count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        ranked.truncate(top.take(ranked.len()));
        ranked
    }

    /// Every bucket in ranked order
    pub fn ranked(&self) -> Vec<RankedBucket> {
        self.top_n(TopN::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedBucket {
    pub label: String,
    pub count: u64,
}

/// Counts for one dimension together with its bounded ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionReport {
    pub dimension: Dimension,
    pub counts: AggregateResult,
    pub top: Vec<RankedBucket>,
}

impl DimensionReport {
    fn new(dimension: Dimension, counts: AggregateResult, top: TopN) -> Self {
        let ranked = counts.top_n(top);
        metrics::aggregate::dimension_computed(dimension.name(), counts.len());
        debug!("Dimension {} has {} buckets", dimension, counts.len());
        Self {
            dimension,
            counts,
            top: ranked,
        }
    }

    /// Highest-ranked bucket, if any
    pub fn leader(&self) -> Option<&RankedBucket> {
        self.top.first()
    }
}

/// Count each record once under the key produced by `key`; `None` lands in
/// the Unknown bucket so bucket totals always equal the record count.
pub fn group_count<F>(records: &[EnrichedRecord], key: F) -> AggregateResult
where
    F: Fn(&EnrichedRecord) -> Option<String>,
{
    let mut result = AggregateResult::new();
    for record in records {
        match key(record) {
            Some(label) => result.increment(&label),
            None => result.increment(UNKNOWN),
        }
    }
    result
}

/// Count each individual value of a multi-valued attribute. A record with no
/// values contributes nothing.
pub fn exploded_group_count<F>(records: &[EnrichedRecord], values: F) -> AggregateResult
where
    F: Fn(&EnrichedRecord) -> &[String],
{
    let mut result = AggregateResult::new();
    for record in records {
        for value in values(record) {
            result.increment(value);
        }
    }
    result
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: u32,
    pub max: u32,
    pub mean: f64,
}

/// Non-absent values of a numeric attribute, ready for histogram binning
/// downstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericDistribution {
    pub values: Vec<u32>,
    pub stats: Option<DescriptiveStats>,
    /// value -> number of records with that value, ascending by value
    pub frequencies: BTreeMap<u32, u64>,
}

impl NumericDistribution {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<u32>>,
    {
        let values: Vec<u32> = values.into_iter().flatten().collect();

        let mut frequencies = BTreeMap::new();
        for v in &values {
            *frequencies.entry(*v).or_insert(0u64) += 1;
        }

        let stats = match (values.iter().min(), values.iter().max()) {
            (Some(&min), Some(&max)) => {
                let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
                Some(DescriptiveStats {
                    count: values.len(),
                    min,
                    max,
                    mean: sum as f64 / values.len() as f64,
                })
            }
            _ => None,
        };

        Self {
            values,
            stats,
            frequencies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Titles added per year, ascending by year; records without a year are skipped.
pub fn yearly_trend(records: &[EnrichedRecord]) -> Vec<(i32, u64)> {
    let mut per_year: BTreeMap<i32, u64> = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.year_added) {
        *per_year.entry(year).or_insert(0) += 1;
    }
    per_year.into_iter().collect()
}

/// Every aggregate one run reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogAggregates {
    pub total_records: usize,
    pub content_types: DimensionReport,
    pub genres: DimensionReport,
    pub countries: DimensionReport,
    pub primary_countries: DimensionReport,
    pub directors: DimensionReport,
    pub actors: DimensionReport,
    pub ratings: DimensionReport,
    pub years_added: DimensionReport,
    pub release_years: DimensionReport,
    pub year_trend: Vec<(i32, u64)>,
    pub movie_durations: NumericDistribution,
    pub tv_seasons: NumericDistribution,
}

impl CatalogAggregates {
    pub fn dimension_reports(&self) -> [&DimensionReport; 9] {
        [
            &self.content_types,
            &self.genres,
            &self.countries,
            &self.primary_countries,
            &self.directors,
            &self.actors,
            &self.ratings,
            &self.years_added,
            &self.release_years,
        ]
    }
}

/// Per-dimension aggregation driven by the run configuration
pub struct Aggregator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn by_content_type(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = group_count(records, |r| Some(r.content_type.label().to_string()));
        DimensionReport::new(Dimension::ContentType, counts, TopN::All)
    }

    pub fn by_genre(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = exploded_group_count(records, |r| r.genres.as_slice());
        DimensionReport::new(Dimension::Genre, counts, self.config.top_genres)
    }

    pub fn by_country(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = exploded_group_count(records, |r| r.countries.as_slice());
        DimensionReport::new(Dimension::Country, counts, self.config.top_countries)
    }

    pub fn by_primary_country(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = group_count(records, |r| Some(r.primary_country.clone()));
        DimensionReport::new(Dimension::PrimaryCountry, counts, self.config.top_countries)
    }

    pub fn by_director(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = exploded_group_count(records, |r| r.directors.as_slice());
        DimensionReport::new(Dimension::Director, counts, self.config.top_people)
    }

    pub fn by_actor(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = exploded_group_count(records, |r| r.actors.as_slice());
        DimensionReport::new(Dimension::Actor, counts, self.config.top_people)
    }

    pub fn by_rating(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = group_count(records, |r| r.rating.clone());
        DimensionReport::new(Dimension::Rating, counts, self.config.top_ratings)
    }

    pub fn by_year_added(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = group_count(records, |r| r.year_added.map(|y| y.to_string()));
        DimensionReport::new(Dimension::YearAdded, counts, TopN::All)
    }

    pub fn by_release_year(&self, records: &[EnrichedRecord]) -> DimensionReport {
        let counts = group_count(records, |r| r.release_year.map(|y| y.to_string()));
        DimensionReport::new(Dimension::ReleaseYear, counts, TopN::All)
    }

    pub fn movie_durations(&self, records: &[EnrichedRecord]) -> NumericDistribution {
        NumericDistribution::from_values(records.iter().map(|r| r.duration_minutes))
    }

    pub fn tv_seasons(&self, records: &[EnrichedRecord]) -> NumericDistribution {
        NumericDistribution::from_values(records.iter().map(|r| r.season_count))
    }

    /// Compute every dimension in one call
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn aggregate(&self, records: &[EnrichedRecord]) -> CatalogAggregates {
        let t_aggregate = std::time::Instant::now();

        let aggregates = CatalogAggregates {
            total_records: records.len(),
            content_types: self.by_content_type(records),
            genres: self.by_genre(records),
            countries: self.by_country(records),
            primary_countries: self.by_primary_country(records),
            directors: self.by_director(records),
            actors: self.by_actor(records),
            ratings: self.by_rating(records),
            years_added: self.by_year_added(records),
            release_years: self.by_release_year(records),
            year_trend: yearly_trend(records),
            movie_durations: self.movie_durations(records),
            tv_seasons: self.tv_seasons(records),
        };

        metrics::aggregate::duration(t_aggregate.elapsed().as_secs_f64());
        info!(
            "Aggregated {} records: {} genres, {} countries, {} ratings",
            records.len(),
            aggregates.genres.counts.len(),
            aggregates.countries.counts.len(),
            aggregates.ratings.counts.len()
        );
        aggregates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;
    use crate::pipeline::processing::enrich::{DefaultEnricher, Enricher};

    fn enrich(rows: Vec<RawRecord>) -> Vec<EnrichedRecord> {
        let enricher = DefaultEnricher::new();
        rows.iter().map(|r| enricher.enrich(r)).collect()
    }

    fn genre_row(genres: &str) -> RawRecord {
        RawRecord::new().with("type", "Movie").with("listed_in", genres)
    }

    #[test]
    fn test_two_title_scenario() {
        let records = enrich(vec![
            RawRecord::new()
                .with("type", "Movie")
                .with("duration", "90 min")
                .with("listed_in", "Action, Drama"),
            RawRecord::new()
                .with("type", "TV Show")
                .with("duration", "3 Seasons")
                .with("listed_in", "Drama"),
        ]);
        let config = AnalysisConfig {
            top_genres: TopN::Limit(1),
            ..AnalysisConfig::default()
        };
        let genres = Aggregator::new(&config).by_genre(&records);

        assert_eq!(records[0].duration_minutes, Some(90));
        assert_eq!(records[1].duration_minutes, None);
        assert_eq!(records[0].season_count, None);
        assert_eq!(records[1].season_count, Some(3));
        assert_eq!(genres.counts.get("Action"), 1);
        assert_eq!(genres.counts.get("Drama"), 2);
        assert_eq!(genres.top.len(), 1);
        assert_eq!(genres.top[0].label, "Drama");
    }

    #[test]
    fn test_group_count_totals_equal_record_count() {
        let records = enrich(vec![
            RawRecord::new().with("type", "Movie").with("rating", "PG"),
            RawRecord::new().with("type", "TV Show"),
            RawRecord::new().with("type", "Podcast").with("rating", "tv-ma"),
            RawRecord::new(),
        ]);
        let config = AnalysisConfig::default();
        let aggregator = Aggregator::new(&config);

        let types = aggregator.by_content_type(&records);
        assert_eq!(types.counts.total(), 4);
        assert_eq!(types.counts.get("Unknown"), 2);

        let ratings = aggregator.by_rating(&records);
        assert_eq!(ratings.counts.total(), 4);
        assert_eq!(ratings.counts.get("Unknown"), 2);
        assert_eq!(ratings.counts.get("TV-MA"), 1);

        let years = aggregator.by_year_added(&records);
        assert_eq!(years.counts.total(), 4);
        assert_eq!(years.counts.get("Unknown"), 4);
    }

    #[test]
    fn test_exploded_totals() {
        let single = enrich(vec![genre_row("Drama"), genre_row("Comedy"), genre_row("Drama")]);
        let config = AnalysisConfig::default();
        let genres = Aggregator::new(&config).by_genre(&single);
        assert_eq!(genres.counts.total(), single.len() as u64);

        let multi = enrich(vec![genre_row("Drama, Comedy"), genre_row("Comedy"), genre_row("Horror")]);
        let genres = Aggregator::new(&config).by_genre(&multi);
        assert!(genres.counts.total() > multi.len() as u64);
        assert_eq!(genres.counts.total(), 4);
    }

    #[test]
    fn test_exploded_counts_duplicates_within_record() {
        let records = enrich(vec![genre_row("Drama, Drama")]);
        let counts = exploded_group_count(&records, |r| r.genres.as_slice());
        assert_eq!(counts.get("Drama"), 2);
    }

    #[test]
    fn test_top_n_tie_break_is_lexicographic() {
        let mut counts = AggregateResult::new();
        for label in ["Thriller", "Comedy", "Action", "Drama", "Drama", "Comedy", "Action", "Thriller"] {
            counts.increment(label);
        }
        counts.increment("Drama");

        let ranked = counts.ranked();
        let labels: Vec<&str> = ranked.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Drama", "Action", "Comedy", "Thriller"]);

        let top2 = counts.top_n(TopN::Limit(2));
        assert_eq!(top2[1].label, "Action");
    }

    #[test]
    fn test_top_n_zero_limit_returns_every_bucket() {
        let mut counts = AggregateResult::new();
        counts.increment("Drama");
        counts.increment("Comedy");

        let ranked = counts.top_n(TopN::Limit(0));
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked, counts.ranked());
    }

    #[test]
    fn test_top_n_is_order_independent() {
        let rows = vec!["B", "A", "C", "A", "B", "C", "D"];
        let forward = enrich(rows.iter().map(|g| genre_row(g)).collect());
        let backward = enrich(rows.iter().rev().map(|g| genre_row(g)).collect());
        let rotated = enrich(rows.iter().cycle().skip(3).take(rows.len()).map(|g| genre_row(g)).collect());

        for n in [1, 2, 3, 4, 10] {
            let top = TopN::Limit(n);
            let a = exploded_group_count(&forward, |r| r.genres.as_slice()).top_n(top);
            let b = exploded_group_count(&backward, |r| r.genres.as_slice()).top_n(top);
            let c = exploded_group_count(&rotated, |r| r.genres.as_slice()).top_n(top);
            assert_eq!(a, b);
            assert_eq!(a, c);
        }
        let all = exploded_group_count(&forward, |r| r.genres.as_slice()).ranked();
        let labels: Vec<&str> = all.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_top_zero_returns_all_genres() {
        let records = enrich(vec![
            genre_row("Drama, Comedy"),
            genre_row("Horror, Drama"),
            genre_row("Anime"),
        ]);
        let config = AnalysisConfig {
            top_genres: TopN::from(0),
            ..AnalysisConfig::default()
        };
        let genres = Aggregator::new(&config).by_genre(&records);

        assert_eq!(genres.top.len(), 4);
        assert_eq!(genres.top[0].label, "Drama");

        let oversized = genres.counts.top_n(TopN::Limit(100));
        assert_eq!(oversized.len(), 4);
    }

    #[test]
    fn test_numeric_distribution() {
        let dist = NumericDistribution::from_values(vec![Some(90), None, Some(120), Some(90), None]);
        let stats = dist.stats.clone().unwrap();

        assert_eq!(dist.values, vec![90, 120, 90]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 90);
        assert_eq!(stats.max, 120);
        assert!((stats.mean - 100.0).abs() < f64::EPSILON);
        assert_eq!(dist.frequencies.get(&90), Some(&2));

        let empty = NumericDistribution::from_values(vec![None, None]);
        assert!(empty.is_empty());
        assert!(empty.stats.is_none());
    }

    #[test]
    fn test_yearly_trend_is_sorted_and_skips_unknown() {
        let records = enrich(vec![
            RawRecord::new().with("date_added", "January 1, 2020"),
            RawRecord::new().with("date_added", "3/5/2018"),
            RawRecord::new().with("date_added", "garbage"),
            RawRecord::new().with("date_added", "2020-06-01"),
        ]);

        assert_eq!(yearly_trend(&records), vec![(2018, 1), (2020, 2)]);
    }

    #[test]
    fn test_primary_country_vs_exploded_country() {
        let records = enrich(vec![
            RawRecord::new().with("country", "India, United States"),
            RawRecord::new().with("country", "United States"),
            RawRecord::new().with("country", ""),
        ]);
        let config = AnalysisConfig::default();
        let aggregator = Aggregator::new(&config);

        let primary = aggregator.by_primary_country(&records);
        assert_eq!(primary.counts.total(), 3);
        assert_eq!(primary.counts.get("Unknown"), 1);

        let exploded = aggregator.by_country(&records);
        assert_eq!(exploded.counts.get("United States"), 2);
        assert_eq!(exploded.counts.get("Unknown"), 0);
        assert_eq!(exploded.leader().map(|b| b.label.as_str()), Some("United States"));
    }

    #[test]
    fn test_aggregate_bundles_dimensions() {
        let records = enrich(vec![
            RawRecord::new()
                .with("type", "Movie")
                .with("duration", "100 min")
                .with("director", "A. Director")
                .with("cast", "X, Y"),
            RawRecord::new()
                .with("type", "TV Show")
                .with("duration", "2 Seasons")
                .with("cast", "Y"),
        ]);
        let config = AnalysisConfig::default();
        let aggregates = Aggregator::new(&config).aggregate(&records);

        assert_eq!(aggregates.total_records, 2);
        assert_eq!(aggregates.actors.leader().map(|b| b.label.as_str()), Some("Y"));
        assert_eq!(aggregates.directors.counts.total(), 1);
        assert_eq!(aggregates.movie_durations.values, vec![100]);
        assert_eq!(aggregates.tv_seasons.values, vec![2]);
        assert_eq!(aggregates.dimension_reports().len(), 9);
        for report in aggregates.dimension_reports() {
            if !report.dimension.is_exploded() {
                assert_eq!(report.counts.total(), 2, "dimension {}", report.dimension);
            }
        }
    }
}
