use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{json_kind, LoadError};

/// One element of the loaded array. Always a JSON object once it is inside a
/// [`Dataset`].
pub type Record = JsonValue;

/// An immutable, ordered set of records.
///
/// Records are shared behind `Arc`, so deriving a filtered dataset clones
/// pointers rather than documents and the source is never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Arc<Record>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a UTF-8 JSON document whose top level must be an array of objects
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let json: JsonValue = serde_json::from_str(text)?;
        Self::from_json(json)
    }

    /// Build a dataset from an already parsed document
    pub fn from_json(json: JsonValue) -> Result<Self, LoadError> {
        let items = match json {
            JsonValue::Array(items) => items,
            other => {
                return Err(LoadError::NotAnArray {
                    found: json_kind(&other),
                })
            }
        };

        if let Some((index, item)) = items.iter().enumerate().find(|(_, v)| !v.is_object()) {
            return Err(LoadError::NotAnObject {
                index,
                found: json_kind(item),
            });
        }

        debug!(target: "dataset", "Parsed {} records", items.len());
        Ok(Self {
            records: items.into_iter().map(Arc::new).collect(),
        })
    }

    /// Read and parse a JSON file from disk
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
        let dataset = Self::from_json_str(&text)
            .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))?;
        info!(
            target: "dataset",
            "Loaded {} records from {}",
            dataset.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first().map(|r| r.as_ref())
    }

    /// Iterate records in document order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().map(|r| r.as_ref())
    }

    /// Derive a new dataset keeping the records the predicate accepts, in
    /// their original relative order
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool,
    {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| predicate(record.as_ref()))
                .cloned()
                .collect(),
        }
    }
}
