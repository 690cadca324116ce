use chrono::Datelike;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::config::AnalysisConfig;
use crate::constants::{
    COL_CAST, COL_COUNTRY, COL_DATE_ADDED, COL_DIRECTOR, COL_DURATION, COL_LISTED_IN,
    COL_RATING, COL_RELEASE_YEAR, COL_SHOW_ID, COL_TITLE, COL_TYPE, UNKNOWN,
};
use crate::domain::{ContentType, EnrichedRecord, RawRecord};
use crate::observability::metrics;
use crate::pipeline::processing::parser::{
    classify_content_type, normalize_rating, parse_date, parse_duration, parse_year,
    split_multi_value, ParsedDuration,
};

/// Trait for turning one normalized raw record into its enriched form.
///
/// Enrichment is infallible: every field-level failure becomes an absent
/// value, so each input record yields exactly one output record.
pub trait Enricher: Send + Sync {
    fn enrich(&self, record: &RawRecord) -> EnrichedRecord;
}

/// Default enricher applying the field parsers to the well-known catalog columns
#[derive(Debug, Clone, Default)]
pub struct DefaultEnricher {
    /// Keep only the first N cast members of each title
    pub cast_limit: Option<usize>,
}

impl DefaultEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            cast_limit: config.cast_limit(),
        }
    }

    /// Gate a parsed duration on the declared content type.
    ///
    /// The declared type is trusted: a Movie whose duration reads as seasons (or
    /// a TV Show whose duration reads as minutes) keeps neither value.
    fn resolve_duration(
        &self,
        content_type: ContentType,
        raw: Option<&str>,
    ) -> (Option<u32>, Option<u32>) {
        let Some(raw) = raw else {
            return (None, None);
        };
        let Some(parsed) = parse_duration(raw) else {
            debug!("Unparseable duration '{}'", raw);
            metrics::enrich::duration_parse_failure();
            return (None, None);
        };

        match (content_type, parsed) {
            (ContentType::Movie, ParsedDuration::Minutes(m)) => (Some(m), None),
            (ContentType::TvShow, ParsedDuration::Seasons(s)) => (None, Some(s)),
            (ContentType::Movie, ParsedDuration::Seasons(_))
            | (ContentType::TvShow, ParsedDuration::Minutes(_)) => {
                debug!(
                    "Duration '{}' contradicts declared type {}; discarding value",
                    raw, content_type
                );
                metrics::enrich::duration_mismatch(content_type.label());
                (None, None)
            }
            (ContentType::Unknown, _) => (None, None),
        }
    }
}

impl Enricher for DefaultEnricher {
    fn enrich(&self, record: &RawRecord) -> EnrichedRecord {
        let content_type = record
            .non_blank(COL_TYPE)
            .map(classify_content_type)
            .unwrap_or(ContentType::Unknown);
        if content_type == ContentType::Unknown {
            metrics::enrich::unknown_content_type();
        }

        let date_added = record.non_blank(COL_DATE_ADDED).and_then(|raw| {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                debug!("Unparseable date_added '{}'", raw);
                metrics::enrich::date_parse_failure();
            }
            parsed
        });

        let (duration_minutes, season_count) =
            self.resolve_duration(content_type, record.non_blank(COL_DURATION));

        let countries = split_multi_value(record.get(COL_COUNTRY));
        let primary_country = countries
            .first()
            .cloned()
            .unwrap_or_else(|| UNKNOWN.to_string());

        let mut actors = split_multi_value(record.get(COL_CAST));
        if let Some(limit) = self.cast_limit {
            actors.truncate(limit);
        }

        EnrichedRecord {
            show_id: record.non_blank(COL_SHOW_ID).map(str::to_string),
            title: record.non_blank(COL_TITLE).map(str::to_string),
            content_type,
            date_added,
            year_added: date_added.map(|d| d.year()),
            release_year: record.non_blank(COL_RELEASE_YEAR).and_then(parse_year),
            duration_minutes,
            season_count,
            genres: split_multi_value(record.get(COL_LISTED_IN)),
            countries,
            primary_country,
            directors: split_multi_value(record.get(COL_DIRECTOR)),
            actors,
            rating: record.non_blank(COL_RATING).and_then(normalize_rating),
        }
    }
}

/// Enrich every record, preserving input order.
///
/// With `parallel` set the records are spread across the rayon pool; the
/// result is identical to the sequential run.
#[instrument(skip(enricher, records), fields(records = records.len()))]
pub fn enrich_all(enricher: &dyn Enricher, records: &[RawRecord], parallel: bool) -> Vec<EnrichedRecord> {
    let t_enrich = std::time::Instant::now();

    let enriched: Vec<EnrichedRecord> = if parallel {
        records.par_iter().map(|r| enricher.enrich(r)).collect()
    } else {
        records.iter().map(|r| enricher.enrich(r)).collect()
    };

    metrics::enrich::records_enriched(enriched.len());
    metrics::enrich::duration(t_enrich.elapsed().as_secs_f64());
    info!("Enriched {} records (parallel={})", enriched.len(), parallel);
    enriched
}
