//! Field parsers: pure, total functions turning one raw cell into a typed value.
//!
//! None of these functions panic or return errors. Unparseable input yields
//! `None` (or an empty list for the splitter) and the caller decides what the
//! absence means.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{CANONICAL_RATINGS, MULTI_VALUE_DELIMITER};
use crate::domain::ContentType;

/// Date formats tried in priority order; the first successful parse wins.
pub const DATE_FORMATS: [&str; 5] = [
    "%B %d, %Y", // September 9, 2019 (chrono also accepts "Sep 9, 2019")
    "%m/%d/%y",  // 9/24/21
    "%m/%d/%Y",  // 9/9/2019
    "%Y-%m-%d",  // 2019-09-09
    "%d-%b-%y",  // 9-Sep-19
];

/// Timestamp format whose date part is also accepted
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `%Y` takes any digit count, so short years would otherwise parse as
/// first-millennium dates
const MIN_PLAUSIBLE_YEAR: i32 = 1000;

static LEADING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([0-9]+)(.*)$").expect("leading integer regex is valid"));

static RATING_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("rating separator regex is valid"));

/// Parse a calendar date from any supported text format.
///
/// Parses landing before year 1000 are rejected.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .chain(
            NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date()),
        )
        .find(|d| d.year() >= MIN_PLAUSIBLE_YEAR)
}

/// Structured value extracted from a free-text duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedDuration {
    Minutes(u32),
    Seasons(u32),
}

/// Parse "<N> min" or "<N> Season(s)" style durations.
///
/// The integer must lead the trimmed text; a sign, a missing number or a
/// number that overflows `u32` gives `None`. The unit is matched by substring,
/// case-insensitively, with "min" checked before "season".
pub fn parse_duration(raw: &str) -> Option<ParsedDuration> {
    let captures = LEADING_INTEGER.captures(raw.trim())?;
    let value: u32 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_default();

    if unit.contains("min") {
        Some(ParsedDuration::Minutes(value))
    } else if unit.contains("season") {
        Some(ParsedDuration::Seasons(value))
    } else {
        None
    }
}

/// Split a comma-joined field into trimmed, non-empty values in order.
/// Missing input yields an empty list.
pub fn split_multi_value(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(MULTI_VALUE_DELIMITER)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Map a rating onto its canonical uppercase token when recognized.
/// Unrecognized values come back trimmed but otherwise untouched; blank input
/// gives `None`.
pub fn normalize_rating(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = RATING_SEPARATORS
        .replace_all(&trimmed.to_uppercase(), "-")
        .into_owned();

    match CANONICAL_RATINGS.iter().find(|r| **r == candidate) {
        Some(canonical) => Some((*canonical).to_string()),
        None => Some(trimmed.to_string()),
    }
}

/// Classify raw type text, ignoring case, whitespace and punctuation.
pub fn classify_content_type(raw: &str) -> ContentType {
    let key: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    match key.as_str() {
        "movie" | "film" => ContentType::Movie,
        "tvshow" | "tvseries" | "series" => ContentType::TvShow,
        _ => ContentType::Unknown,
    }
}

/// Parse a numeric year, tolerating a trailing ".0" from spreadsheet exports.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    let s = s.strip_suffix(".0").unwrap_or(s);
    s.parse::<i32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date_supported_formats() {
        let expected = NaiveDate::from_ymd_opt(2019, 9, 9).unwrap();
        assert_eq!(parse_date("September 9, 2019"), Some(expected));
        assert_eq!(parse_date(" September 9, 2019 "), Some(expected));
        assert_eq!(parse_date("Sep 9, 2019"), Some(expected));
        assert_eq!(parse_date("9/9/2019"), Some(expected));
        assert_eq!(parse_date("09/09/2019"), Some(expected));
        assert_eq!(parse_date("2019-09-09"), Some(expected));
        assert_eq!(parse_date("9-Sep-19"), Some(expected));
        assert_eq!(parse_date("2019-09-09 00:00:00"), Some(expected));
        assert_eq!(parse_date("9/9/19"), Some(expected));
        assert_eq!(parse_date("9/24/21"), NaiveDate::from_ymd_opt(2021, 9, 24));
    }

    #[test]
    fn test_parse_date_rejects_first_millennium_years() {
        assert_eq!(parse_date("21-09-24"), None);
        assert_eq!(parse_date("Sep 9, 21"), None);
        assert_eq!(parse_date("0999-01-01"), None);
        assert_eq!(parse_date("1000-01-01"), NaiveDate::from_ymd_opt(1000, 1, 1));
    }

    #[test]
    fn test_parse_date_round_trip() {
        let dates = [
            NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2016, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
        ];
        let formats = [
            "%B %-d, %Y",
            "%B %d, %Y",
            "%-m/%-d/%y",
            "%-m/%-d/%Y",
            "%m/%d/%Y",
            "%Y-%m-%d",
            "%-d-%b-%y",
        ];

        for date in dates {
            for fmt in formats {
                let text = date.format(fmt).to_string();
                let parsed = parse_date(&text).unwrap_or_else(|| panic!("failed to parse {text}"));
                assert_eq!(
                    (parsed.year(), parsed.month(), parsed.day()),
                    (date.year(), date.month(), date.day()),
                    "round trip through {fmt}"
                );
            }
        }
    }

    #[test]
    fn test_parse_date_garbage_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("13/45/2019"), None);
        assert_eq!(parse_date("February 30, 2019"), None);
        assert_eq!(parse_date("🎬"), None);
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("90 min"), Some(ParsedDuration::Minutes(90)));
        assert_eq!(parse_duration("90min"), Some(ParsedDuration::Minutes(90)));
        assert_eq!(parse_duration(" 125 MIN "), Some(ParsedDuration::Minutes(125)));
        assert_eq!(parse_duration("1 Season"), Some(ParsedDuration::Seasons(1)));
        assert_eq!(parse_duration("3 Seasons"), Some(ParsedDuration::Seasons(3)));
        assert_eq!(parse_duration("2 seasons"), Some(ParsedDuration::Seasons(2)));
    }

    #[test]
    fn test_parse_duration_is_total() {
        let inputs = [
            "",
            "   ",
            "min",
            "Seasons",
            "ninety min",
            "-5 min",
            "+5 min",
            "90",
            "90 hours",
            "about 90 min",
            "99999999999999999999999 min",
            "4294967296 min",
            "٣ min",
            "\u{0}",
        ];
        for input in inputs {
            assert_eq!(parse_duration(input), None, "input {input:?}");
        }
        assert_eq!(parse_duration("4294967295 min"), Some(ParsedDuration::Minutes(u32::MAX)));
        assert_eq!(parse_duration("0 min"), Some(ParsedDuration::Minutes(0)));
    }

    #[test]
    fn test_split_multi_value() {
        assert_eq!(split_multi_value(Some("Action, Drama")), vec!["Action", "Drama"]);
        assert_eq!(
            split_multi_value(Some(" Drama ,, Comedy , Drama,")),
            vec!["Drama", "Comedy", "Drama"]
        );
        assert!(split_multi_value(Some("")).is_empty());
        assert!(split_multi_value(Some(" , ,")).is_empty());
        assert!(split_multi_value(None).is_empty());
    }

    #[test]
    fn test_normalize_rating() {
        assert_eq!(normalize_rating("tv-ma").as_deref(), Some("TV-MA"));
        assert_eq!(normalize_rating(" pg-13 ").as_deref(), Some("PG-13"));
        assert_eq!(normalize_rating("TV Y7 FV").as_deref(), Some("TV-Y7-FV"));
        assert_eq!(normalize_rating("nc_17").as_deref(), Some("NC-17"));
        assert_eq!(normalize_rating("74 min").as_deref(), Some("74 min"));
        assert_eq!(normalize_rating("Not Rated").as_deref(), Some("Not Rated"));
        assert_eq!(normalize_rating("  "), None);
    }

    #[test]
    fn test_classify_content_type() {
        assert_eq!(classify_content_type("Movie"), ContentType::Movie);
        assert_eq!(classify_content_type("  movie "), ContentType::Movie);
        assert_eq!(classify_content_type("TV Show"), ContentType::TvShow);
        assert_eq!(classify_content_type("tv show"), ContentType::TvShow);
        assert_eq!(classify_content_type("TV-Show"), ContentType::TvShow);
        assert_eq!(classify_content_type("TVSHOW"), ContentType::TvShow);
        assert_eq!(classify_content_type("Documentary"), ContentType::Unknown);
        assert_eq!(classify_content_type(""), ContentType::Unknown);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year(" 2019.0 "), Some(2019));
        assert_eq!(parse_year("twenty"), None);
        assert_eq!(parse_year(""), None);
    }
}
