//! Postal directory index service
//!
//! This module provides the in-memory index over the All-India postal
//! directory. The index is built exactly once from the source CSV and is
//! read-only afterwards, so it can be shared across concurrent readers
//! without locking.

use crate::app::models::PostalRecord;
use std::collections::HashMap;
use std::path::PathBuf;

pub mod handle;
pub mod loader;
pub mod metadata;
pub mod query;

// Re-export key types for convenience
pub use handle::Directory;
pub use metadata::{DirectoryStats, LoadStats};
pub use query::ValidationOutcome;

/// In-memory index over admitted post-office records
///
/// Records live in a single arena in source-file order; the four mappings
/// hold record indices, so a record appearing under several keys is never
/// copied. Keys are the exact pincode and the lowercased office name,
/// district and state.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    /// Admitted records in source-file order
    pub(crate) records: Vec<PostalRecord>,

    /// Record indices by exact pincode
    pub(crate) by_pincode: HashMap<String, Vec<u32>>,

    /// Record indices by lowercased office name
    pub(crate) by_office: HashMap<String, Vec<u32>>,

    /// Record indices by lowercased district
    pub(crate) by_district: HashMap<String, Vec<u32>>,

    /// Record indices by lowercased state
    pub(crate) by_state: HashMap<String, Vec<u32>>,

    /// Path the index was loaded from
    pub(crate) source_path: PathBuf,
}

impl DirectoryIndex {
    /// Create a new empty index for the given source path
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            records: Vec::new(),
            by_pincode: HashMap::new(),
            by_office: HashMap::new(),
            by_district: HashMap::new(),
            by_state: HashMap::new(),
            source_path,
        }
    }

    /// Insert an admitted record into the arena and all four mappings
    pub(crate) fn insert(&mut self, record: PostalRecord) {
        let idx = self.records.len() as u32;

        self.by_pincode
            .entry(record.pincode.clone())
            .or_default()
            .push(idx);
        self.by_office
            .entry(record.office_name.to_lowercase())
            .or_default()
            .push(idx);
        self.by_district
            .entry(record.district.to_lowercase())
            .or_default()
            .push(idx);
        self.by_state
            .entry(record.state.to_lowercase())
            .or_default()
            .push(idx);

        self.records.push(record);
    }

    /// Total number of records in the index
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path the index was loaded from
    pub fn source_path(&self) -> &std::path::Path {
        &self.source_path
    }

    /// All records in source-file order
    pub fn records(&self) -> impl Iterator<Item = &PostalRecord> {
        self.records.iter()
    }
}
