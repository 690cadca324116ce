use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{MOVIE_LABEL, TV_SHOW_LABEL, UNKNOWN};

/// One input row. `None` means the cell was absent from the row; `Some("")`
/// means it was present but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: BTreeMap<String, Option<String>>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a present value
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), Some(value.into()));
        self
    }

    /// Builder-style insert of an absent value
    pub fn with_absent(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), None);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Option<String>) {
        self.fields.insert(field.into(), value);
    }

    /// Raw value of a field, if the field exists and the cell was present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    /// Value of a field only when it is present and not blank.
    pub fn non_blank(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A header plus the ordered rows read from a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataset {
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawDataset {
    pub fn new(columns: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { columns, records }
    }

    /// Build a dataset whose header is the union of all record fields, in
    /// first-seen order.
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for (field, _) in record.fields() {
                if !columns.iter().any(|c| c == field) {
                    columns.push(field.to_string());
                }
            }
        }
        Self { columns, records }
    }
}

/// Normalized content type of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
    Unknown,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Movie, ContentType::TvShow, ContentType::Unknown];

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Movie => MOVIE_LABEL,
            ContentType::TvShow => TV_SHOW_LABEL,
            ContentType::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog title after field parsing. Built once by the enricher and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub show_id: Option<String>,
    pub title: Option<String>,
    pub content_type: ContentType,
    pub date_added: Option<NaiveDate>,
    pub year_added: Option<i32>,
    pub release_year: Option<i32>,
    pub duration_minutes: Option<u32>,
    pub season_count: Option<u32>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub primary_country: String,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub rating: Option<String>,
}

impl EnrichedRecord {
    /// Rating label used for grouping; absent ratings fall into the Unknown bucket.
    pub fn rating_label(&self) -> &str {
        self.rating.as_deref().unwrap_or(UNKNOWN)
    }
}
