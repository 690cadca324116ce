/// Canonical column names expected in a catalog export.
/// Columns are matched after canonicalization (trimmed, lower-case, `_`-joined).
pub const COL_SHOW_ID: &str = "show_id";
pub const COL_TYPE: &str = "type";
pub const COL_TITLE: &str = "title";
pub const COL_DIRECTOR: &str = "director";
pub const COL_CAST: &str = "cast";
pub const COL_COUNTRY: &str = "country";
pub const COL_DATE_ADDED: &str = "date_added";
pub const COL_RELEASE_YEAR: &str = "release_year";
pub const COL_RATING: &str = "rating";
pub const COL_DURATION: &str = "duration";
pub const COL_LISTED_IN: &str = "listed_in";

/// Columns the enricher reads. Missing ones are tolerated but logged.
pub const WELL_KNOWN_COLUMNS: [&str; 9] = [
    COL_TYPE,
    COL_DATE_ADDED,
    COL_RELEASE_YEAR,
    COL_DURATION,
    COL_LISTED_IN,
    COL_COUNTRY,
    COL_DIRECTOR,
    COL_CAST,
    COL_RATING,
];

// Sentinels
pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

// Canonical content-type labels
pub const MOVIE_LABEL: &str = "Movie";
pub const TV_SHOW_LABEL: &str = "TV Show";

/// Delimiter used by multi-valued fields (genres, cast, countries, directors)
pub const MULTI_VALUE_DELIMITER: char = ',';
/// Separator used when writing multi-valued fields back out
pub const MULTI_VALUE_JOIN: &str = ", ";

/// Ratings recognized as canonical tokens
pub const CANONICAL_RATINGS: [&str; 14] = [
    "G", "PG", "PG-13", "R", "NC-17", "NR", "UR", "TV-Y", "TV-Y7", "TV-Y7-FV", "TV-G", "TV-PG",
    "TV-14", "TV-MA",
];

// Top-N defaults
pub const DEFAULT_TOP_N: i64 = 10;
pub const DEFAULT_TOP_RATINGS: i64 = 20;

// Output file names
pub const SUMMARY_FILE: &str = "summary_stats.csv";
pub const CLEANED_FILE: &str = "cleaned_titles.csv";
pub const CHARTS_FILE: &str = "charts.json";
pub const MANIFEST_FILE: &str = "run_manifest.json";
pub const AGGREGATES_DIR: &str = "aggregates";
pub const YEAR_TREND_FILE: &str = "year_added_trend.csv";

// Environment/config defaults
pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_LOG_DIR: &str = "logs";
