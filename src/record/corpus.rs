//! Loading a pre-normalized corpus of records from JSON.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{RecordSeekError, Result};
use crate::record::record::Record;

/// Accepted top-level JSON shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Records(Vec<Record>),
    Wrapped { records: Vec<Record> },
}

/// An in-memory list of records, resident for the lifetime of one load.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<Record>,
}

impl Corpus {
    /// Create a corpus from already-built records.
    pub fn new(records: Vec<Record>) -> Self {
        Corpus { records }
    }

    /// Parse a JSON array of records, or an object with a `records` array.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records = match serde_json::from_str::<CorpusFile>(json) {
            Ok(CorpusFile::Records(records)) | Ok(CorpusFile::Wrapped { records }) => records,
            // Untagged errors are opaque, so re-parse as a plain array to
            // surface the real field-level message.
            Err(_) => serde_json::from_str::<Vec<Record>>(json)?,
        };

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(RecordSeekError::corpus(format!(
                    "duplicate record id '{}'",
                    record.id()
                )));
            }
        }

        debug!("Loaded {} records", records.len());
        Ok(Corpus { records })
    }

    /// Read and parse a corpus file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Read a corpus file, treating any failure as an empty corpus.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_path(path.as_ref()) {
            Ok(corpus) => corpus,
            Err(e) => {
                warn!(
                    "Failed to load corpus from {}: {}; continuing with zero records",
                    path.as_ref().display(),
                    e
                );
                Corpus::default()
            }
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
