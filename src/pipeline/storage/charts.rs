use serde::{Deserialize, Serialize};

use crate::pipeline::processing::aggregate::{CatalogAggregates, DimensionReport, NumericDistribution};

/// Number of equal-width bins used for the movie duration histogram
pub const DURATION_HISTOGRAM_BINS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
}

impl ChartPoint {
    fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Chart-ready data for an external renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub data: Vec<ChartPoint>,
}

fn ranked_chart(id: &str, title: String, x_label: &str, report: &DimensionReport) -> ChartSpec {
    ChartSpec {
        id: id.to_string(),
        title,
        kind: ChartKind::Bar,
        x_label: x_label.to_string(),
        y_label: "Titles".to_string(),
        data: report
            .top
            .iter()
            .map(|b| ChartPoint::new(b.label.clone(), b.count))
            .collect(),
    }
}

fn top_title(prefix: &str, report: &DimensionReport, suffix: &str) -> String {
    format!("{} {} {}", prefix, report.top.len(), suffix)
}

/// Equal-width bins over `[min, max]`, labelled `lo-hi`
pub fn histogram_bins(distribution: &NumericDistribution, bins: u32) -> Vec<ChartPoint> {
    let Some(stats) = distribution.stats.as_ref() else {
        return Vec::new();
    };
    let (min, max) = (u64::from(stats.min), u64::from(stats.max));
    let span = max - min + 1;
    let width = span.div_ceil(u64::from(bins.max(1))).max(1);

    let mut counts: Vec<u64> = vec![0; span.div_ceil(width) as usize];
    for (value, frequency) in &distribution.frequencies {
        let index = ((u64::from(*value) - min) / width) as usize;
        counts[index] += frequency;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lo = min + i as u64 * width;
            let hi = lo + width - 1;
            ChartPoint::new(format!("{}-{}", lo, hi), count)
        })
        .collect()
}

/// Build every chart a run reports
pub fn build_charts(aggregates: &CatalogAggregates) -> Vec<ChartSpec> {
    let mut charts = Vec::with_capacity(9);

    charts.push(ranked_chart(
        "movies_vs_tv",
        "Movies vs TV Shows".to_string(),
        "Type",
        &aggregates.content_types,
    ));

    charts.push(ranked_chart(
        "top_genres",
        top_title("Top", &aggregates.genres, "Genres / Categories"),
        "Genre",
        &aggregates.genres,
    ));

    charts.push(ChartSpec {
        id: "content_added_per_year".to_string(),
        title: "Content Added Over Years".to_string(),
        kind: ChartKind::Line,
        x_label: "Year Added".to_string(),
        y_label: "Titles".to_string(),
        data: aggregates
            .year_trend
            .iter()
            .map(|(year, count)| ChartPoint::new(year.to_string(), *count))
            .collect(),
    });

    charts.push(ranked_chart(
        "top_countries",
        top_title("Top", &aggregates.primary_countries, "Countries by Number of Titles"),
        "Country",
        &aggregates.primary_countries,
    ));

    charts.push(ranked_chart(
        "rating_distribution",
        "Content Ratings Distribution".to_string(),
        "Rating",
        &aggregates.ratings,
    ));

    charts.push(ChartSpec {
        id: "movie_duration_distribution".to_string(),
        title: "Distribution of Movie Durations (minutes)".to_string(),
        kind: ChartKind::Histogram,
        x_label: "Minutes".to_string(),
        y_label: "Movies".to_string(),
        data: histogram_bins(&aggregates.movie_durations, DURATION_HISTOGRAM_BINS),
    });

    charts.push(ChartSpec {
        id: "show_seasons_count".to_string(),
        title: "Number of Seasons for TV Shows".to_string(),
        kind: ChartKind::Bar,
        x_label: "Seasons".to_string(),
        y_label: "TV Shows".to_string(),
        data: aggregates
            .tv_seasons
            .frequencies
            .iter()
            .map(|(seasons, count)| ChartPoint::new(seasons.to_string(), *count))
            .collect(),
    });

    charts.push(ranked_chart(
        "top_directors",
        top_title("Top", &aggregates.directors, "Directors by Number of Titles"),
        "Director",
        &aggregates.directors,
    ));

    charts.push(ranked_chart(
        "top_actors",
        top_title("Top", &aggregates.actors, "Actors by Appearances"),
        "Actor",
        &aggregates.actors,
    ));

    charts
}
