use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use super::{sha256_hex, LoadedDataset, RecordSource};
use crate::domain::{RawDataset, RawRecord};
use crate::error::Result;
use crate::observability::metrics;

#[derive(Debug, Clone)]
enum CsvInput {
    File(PathBuf),
    Inline(String),
}

/// CSV record source reading from a file or an in-memory string.
///
/// Rows may be shorter or longer than the header. An empty cell is a present
/// but empty value; a cell missing from a short row is absent. Cells past the
/// end of the header are dropped.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    input: CsvInput,
    delimiter: u8,
}

impl CsvRecordSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: CsvInput::File(path.into()),
            delimiter: b',',
        }
    }

    pub fn from_string(content: impl Into<String>) -> Self {
        Self {
            input: CsvInput::Inline(content.into()),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.input {
            CsvInput::File(p) => Some(p.as_path()),
            CsvInput::Inline(_) => None,
        }
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        match &self.input {
            CsvInput::File(path) => Ok(fs::read(path)?),
            CsvInput::Inline(content) => Ok(content.as_bytes().to_vec()),
        }
    }

    fn parse_bytes(&self, bytes: &[u8]) -> Result<RawDataset> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut records = Vec::new();

        for (index, result) in reader.records().enumerate() {
            let row = result?;
            if row.len() > headers.len() {
                debug!(
                    "Row {} has {} cells for {} columns; extra cells dropped",
                    index + 1,
                    row.len(),
                    headers.len()
                );
            }
            records.push(Self::row_to_record(&headers, &row));
        }

        Ok(RawDataset::new(headers, records))
    }

    fn row_to_record(headers: &[String], row: &StringRecord) -> RawRecord {
        let mut record = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            record.insert(header.clone(), row.get(i).map(str::to_string));
        }
        record
    }
}

impl RecordSource for CsvRecordSource {
    #[instrument(skip(self), fields(source = %self.location()))]
    fn load_with_digest(&self) -> Result<LoadedDataset> {
        let t_load = std::time::Instant::now();
        let bytes = self.read_bytes()?;
        let sha256 = sha256_hex(&bytes);
        let dataset = self.parse_bytes(&bytes)?;

        metrics::load::duration(t_load.elapsed().as_secs_f64());
        info!(
            "Read {} rows with {} columns from {} (sha256 {})",
            dataset.records.len(),
            dataset.columns.len(),
            self.location(),
            sha256
        );
        Ok(LoadedDataset {
            dataset,
            sha256: Some(sha256),
        })
    }

    fn location(&self) -> String {
        match &self.input {
            CsvInput::File(path) => path.display().to_string(),
            CsvInput::Inline(_) => "inline".to_string(),
        }
    }
}
