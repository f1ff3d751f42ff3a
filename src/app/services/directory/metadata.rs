//! Load statistics and directory-level counters
//!
//! This module defines the data structures for tracking dataset loading
//! statistics and for reporting aggregate directory counts to callers.

use serde::Serialize;
use std::time::Duration;

/// Statistics about the directory loading process
#[derive(Debug, Clone)]
pub struct LoadStats {
    /// Number of CSV rows read from the source file
    pub rows_read: usize,

    /// Number of records admitted into the index
    pub records_admitted: usize,

    /// Rows skipped because the office is non-delivery
    pub skipped_non_delivery: usize,

    /// Rows skipped because a coordinate was missing or unparseable
    pub skipped_missing_coords: usize,

    /// Time taken to load the directory
    pub load_duration: Duration,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self {
            rows_read: 0,
            records_admitted: 0,
            skipped_non_delivery: 0,
            skipped_missing_coords: 0,
            load_duration: Duration::ZERO,
        }
    }

    /// Total rows skipped by the admission rules
    pub fn rows_skipped(&self) -> usize {
        self.skipped_non_delivery + self.skipped_missing_coords
    }

    /// Calculate the admission rate as a percentage
    pub fn admission_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.records_admitted as f64 / self.rows_read as f64) * 100.0
        }
    }

    /// Calculate the loading rate in rows per second
    pub fn loading_rate(&self) -> f64 {
        if self.load_duration.is_zero() {
            0.0
        } else {
            self.rows_read as f64 / self.load_duration.as_secs_f64()
        }
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Read {} rows, admitted {} records ({:.1}% admitted, {} non-delivery, {} without coordinates) in {:.2}s",
            self.rows_read,
            self.records_admitted,
            self.admission_rate(),
            self.skipped_non_delivery,
            self.skipped_missing_coords,
            self.load_duration.as_secs_f64()
        )
    }
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate counts over the directory index
///
/// `ready` doubles as the readiness signal: callers poll `stats()` on the
/// directory handle and see `ready: false` with zeroed counts until the
/// build completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
    /// Total records in the index
    pub total_records: usize,

    /// Number of distinct pincodes
    pub unique_pincodes: usize,

    /// Number of distinct office names
    pub unique_offices: usize,

    /// Number of distinct districts
    pub unique_districts: usize,

    /// Number of distinct states
    pub unique_states: usize,

    /// Whether the index has finished building
    pub ready: bool,
}
