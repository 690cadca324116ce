// Pipeline storage: CSV and JSON artifacts written for downstream reporting

pub mod charts;
pub mod manifest;

pub use charts::{build_charts, ChartKind, ChartPoint, ChartSpec};
pub use manifest::RunManifest;

use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{
    AGGREGATES_DIR, CHARTS_FILE, CLEANED_FILE, MANIFEST_FILE, MULTI_VALUE_JOIN, SUMMARY_FILE,
    YEAR_TREND_FILE,
};
use crate::domain::EnrichedRecord;
use crate::error::Result;
use crate::pipeline::processing::aggregate::CatalogAggregates;
use crate::pipeline::processing::summary::SummaryTable;

/// Column order of the cleaned titles export
pub const CLEANED_HEADER: [&str; 14] = [
    "show_id",
    "title",
    "type",
    "date_added",
    "year_added",
    "release_year",
    "duration_minutes",
    "season_count",
    "genres",
    "countries",
    "primary_country",
    "directors",
    "actors",
    "rating",
];

fn opt_to_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn cleaned_row(record: &EnrichedRecord) -> [String; 14] {
    [
        record.show_id.clone().unwrap_or_default(),
        record.title.clone().unwrap_or_default(),
        record.content_type.label().to_string(),
        opt_to_cell(record.date_added.map(|d| d.format("%Y-%m-%d"))),
        opt_to_cell(record.year_added),
        opt_to_cell(record.release_year),
        opt_to_cell(record.duration_minutes),
        opt_to_cell(record.season_count),
        record.genres.join(MULTI_VALUE_JOIN),
        record.countries.join(MULTI_VALUE_JOIN),
        record.primary_country.clone(),
        record.directors.join(MULTI_VALUE_JOIN),
        record.actors.join(MULTI_VALUE_JOIN),
        record.rating.clone().unwrap_or_default(),
    ]
}

/// Writes run artifacts beneath one output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    /// Create the output directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the output directory, for the manifest
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// `metric,value` rows in table order
    pub fn write_summary(&self, table: &SummaryTable) -> Result<PathBuf> {
        let path = self.root.join(SUMMARY_FILE);
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(["metric", "value"])?;
        for (metric, value) in table.to_pairs() {
            writer.write_record([metric, value])?;
        }
        writer.flush()?;

        info!("💾 Wrote summary table to {}", path.display());
        Ok(path)
    }

    /// One `label,count` file per dimension with every bucket in ranked order,
    /// plus the year-added trend in ascending year order
    pub fn write_aggregates(&self, aggregates: &CatalogAggregates) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(AGGREGATES_DIR);
        fs::create_dir_all(&dir)?;
        let mut written = Vec::new();

        for report in aggregates.dimension_reports() {
            let path = dir.join(format!("{}.csv", report.dimension.name()));
            let mut writer = Writer::from_path(&path)?;
            writer.write_record(["label", "count"])?;
            for bucket in report.counts.ranked() {
                writer.write_record([bucket.label, bucket.count.to_string()])?;
            }
            writer.flush()?;
            debug!("Wrote {} buckets to {}", report.counts.len(), path.display());
            written.push(path);
        }

        let trend_path = dir.join(YEAR_TREND_FILE);
        let mut writer = Writer::from_path(&trend_path)?;
        writer.write_record(["year", "count"])?;
        for (year, count) in &aggregates.year_trend {
            writer.write_record([year.to_string(), count.to_string()])?;
        }
        writer.flush()?;
        written.push(trend_path);

        info!("💾 Wrote {} aggregate files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// One row per enriched record; absent values are empty cells
    pub fn write_cleaned(&self, records: &[EnrichedRecord]) -> Result<PathBuf> {
        let path = self.root.join(CLEANED_FILE);
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(CLEANED_HEADER)?;
        for record in records {
            writer.write_record(cleaned_row(record))?;
        }
        writer.flush()?;

        info!("💾 Wrote {} cleaned records to {}", records.len(), path.display());
        Ok(path)
    }

    pub fn write_charts(&self, charts: &[ChartSpec]) -> Result<PathBuf> {
        let path = self.root.join(CHARTS_FILE);
        fs::write(&path, serde_json::to_string_pretty(charts)?)?;
        info!("💾 Wrote {} chart specs to {}", charts.len(), path.display());
        Ok(path)
    }

    pub fn write_manifest(&self, manifest: &RunManifest) -> Result<PathBuf> {
        let path = self.root.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(manifest)?)?;
        info!("💾 Wrote run manifest to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::domain::RawRecord;
    use crate::pipeline::processing::aggregate::Aggregator;
    use crate::pipeline::processing::enrich::{enrich_all, DefaultEnricher};
    use crate::pipeline::processing::summary::build_summary;

    fn enriched() -> Vec<EnrichedRecord> {
        let rows = vec![
            RawRecord::new()
                .with("show_id", "s1")
                .with("title", "Midnight Run")
                .with("type", "Movie")
                .with("duration", "126 min")
                .with("listed_in", "Action, Comedies")
                .with("country", "United States")
                .with("date_added", "June 1, 2020"),
            RawRecord::new()
                .with("show_id", "s2")
                .with("title", "Dark")
                .with("type", "TV Show")
                .with("duration", "3 Seasons")
                .with("listed_in", "Dramas")
                .with("cast", "Louis Hofmann, Oliver Masucci"),
        ];
        enrich_all(&DefaultEnricher::new(), &rows, false)
    }

    #[test]
    fn test_write_cleaned_titles() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();

        let path = writer.write_cleaned(&enriched()).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();

        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(header, CLEANED_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "2020-06-01");
        assert_eq!(&rows[0][6], "126");
        assert_eq!(&rows[0][7], "");
        assert_eq!(&rows[0][8], "Action, Comedies");
        assert_eq!(&rows[1][2], "TV Show");
        assert_eq!(&rows[1][3], "");
        assert_eq!(&rows[1][10], "Unknown");
        assert_eq!(&rows[1][12], "Louis Hofmann, Oliver Masucci");
    }

    #[test]
    fn test_write_summary_and_aggregates() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path().join("nested")).unwrap();
        let config = AnalysisConfig::default();
        let aggregates = Aggregator::new(&config).aggregate(&enriched());
        let summary = build_summary(&aggregates).unwrap_or_else(|e| e.into_partial());

        let summary_path = writer.write_summary(&summary).unwrap();
        let content = fs::read_to_string(&summary_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "metric,value");
        assert_eq!(lines[1], "total_titles,2");
        assert_eq!(lines.len(), 13);

        let written = writer.write_aggregates(&aggregates).unwrap();
        assert_eq!(written.len(), 10);

        let genres = fs::read_to_string(dir.path().join("nested/aggregates/genre.csv")).unwrap();
        assert_eq!(genres, "label,count\nAction,1\nComedies,1\nDramas,1\n");

        let trend = fs::read_to_string(dir.path().join("nested/aggregates/year_added_trend.csv")).unwrap();
        assert_eq!(trend, "year,count\n2020,1\n");
        assert_eq!(writer.relative(&written[0]), "aggregates/content_type.csv");
    }

    #[test]
    fn test_write_charts_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let config = AnalysisConfig::default();
        let aggregates = Aggregator::new(&config).aggregate(&enriched());

        let path = writer.write_charts(&build_charts(&aggregates)).unwrap();
        let charts: Vec<ChartSpec> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(charts.len(), 9);
        assert_eq!(charts[0].id, "movies_vs_tv");
        assert_eq!(charts[0].data.len(), 2);
        assert_eq!(charts[2].kind, ChartKind::Line);
        assert_eq!(charts[5].kind, ChartKind::Histogram);
        assert_eq!(charts[6].data, vec![ChartPoint { label: "3".into(), value: 1 }]);
    }
}
