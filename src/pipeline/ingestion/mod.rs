// Pipeline ingestion: record sources producing raw datasets

pub mod csv_source;

pub use csv_source::CsvRecordSource;

use sha2::{Digest, Sha256};

use crate::domain::{RawDataset, RawRecord};
use crate::error::Result;

/// A loaded dataset plus the checksum of the exact bytes it was parsed from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedDataset {
    pub dataset: RawDataset,
    /// SHA-256 of the underlying input bytes, when the source has any
    pub sha256: Option<String>,
}

/// Anything that can produce a raw catalog dataset
pub trait RecordSource {
    fn load(&self) -> Result<RawDataset> {
        Ok(self.load_with_digest()?.dataset)
    }

    /// Load once, hashing the same bytes that get parsed
    fn load_with_digest(&self) -> Result<LoadedDataset>;

    /// Human-readable origin of the data, recorded in the run manifest
    fn location(&self) -> String;
}

/// Hex-encoded SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Source over pre-built records
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    dataset: RawDataset,
}

impl InMemorySource {
    pub fn new(dataset: RawDataset) -> Self {
        Self { dataset }
    }

    /// Header is the union of the record fields in first-seen order
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self::new(RawDataset::from_records(records))
    }
}

impl RecordSource for InMemorySource {
    fn load_with_digest(&self) -> Result<LoadedDataset> {
        Ok(LoadedDataset {
            dataset: self.dataset.clone(),
            sha256: None,
        })
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex(b"abc").len(), 64);
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemorySource::from_records(vec![
            RawRecord::new().with("type", "Movie"),
            RawRecord::new().with("title", "Only a title"),
        ]);

        let dataset = source.load().unwrap();
        assert_eq!(dataset.columns, vec!["type", "title"]);
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(source.location(), "memory");
        assert_eq!(source.load_with_digest().unwrap().sha256, None);
    }
}
