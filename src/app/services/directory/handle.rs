//! Readiness-gated handle over the directory index
//!
//! The index is built exactly once during initialization; until the build
//! completes every query fails fast with a distinct "not initialized"
//! condition instead of returning empty results. After initialization the
//! handle hands out shared references to the immutable index, so
//! concurrent readers need no locking.

use super::metadata::{DirectoryStats, LoadStats};
use super::query::ValidationOutcome;
use super::DirectoryIndex;
use crate::app::models::PostalRecord;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::debug;

struct LoadedState {
    index: DirectoryIndex,
    load_stats: LoadStats,
}

/// Shared, readiness-gated access to the postal directory
pub struct Directory {
    csv_path: PathBuf,
    state: OnceCell<LoadedState>,
}

impl Directory {
    /// Create an uninitialized directory for the given dataset file
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            state: OnceCell::new(),
        }
    }

    /// Build the index from the dataset, once
    ///
    /// Concurrent callers coalesce onto a single build; calling again
    /// after the directory is ready is a no-op. A load failure leaves the
    /// directory not ready and is returned to every waiting caller.
    pub async fn initialize(&self, show_progress: bool) -> Result<&DirectoryIndex> {
        let state = self
            .state
            .get_or_try_init(|| async {
                let (index, load_stats) =
                    DirectoryIndex::load(&self.csv_path, show_progress).await?;
                Ok::<_, Error>(LoadedState { index, load_stats })
            })
            .await?;

        debug!(
            "Directory ready: {} records from {}",
            state.index.record_count(),
            self.csv_path.display()
        );
        Ok(&state.index)
    }

    /// Whether the index has finished building
    pub fn is_ready(&self) -> bool {
        self.state.initialized()
    }

    /// Path of the backing dataset
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Statistics recorded while loading, if the directory is ready
    pub fn load_stats(&self) -> Option<&LoadStats> {
        self.state.get().map(|s| &s.load_stats)
    }

    /// The built index, or `NotInitialized` before readiness
    pub fn index(&self) -> Result<&DirectoryIndex> {
        self.state
            .get()
            .map(|s| &s.index)
            .ok_or(Error::NotInitialized)
    }

    /// Exact pincode lookup; see [`DirectoryIndex::by_pincode`]
    pub fn by_pincode(&self, pincode: &str) -> Result<Vec<&PostalRecord>> {
        Ok(self.index()?.by_pincode(pincode))
    }

    /// Office substring search; see [`DirectoryIndex::search_offices`]
    pub fn search_offices(&self, query: &str, limit: usize) -> Result<Vec<&PostalRecord>> {
        Ok(self.index()?.search_offices(query, limit))
    }

    /// District exact lookup; see [`DirectoryIndex::by_district`]
    pub fn by_district(&self, district: &str, limit: usize) -> Result<Vec<&PostalRecord>> {
        Ok(self.index()?.by_district(district, limit))
    }

    /// State exact lookup; see [`DirectoryIndex::by_state`]
    pub fn by_state(&self, state: &str, limit: usize) -> Result<Vec<&PostalRecord>> {
        Ok(self.index()?.by_state(state, limit))
    }

    /// Pincode/office validation; see [`DirectoryIndex::validate_pin_office`]
    pub fn validate_pin_office(
        &self,
        pincode: &str,
        office_name: &str,
    ) -> Result<ValidationOutcome> {
        Ok(self.index()?.validate_pin_office(pincode, office_name))
    }

    /// Aggregate statistics, doubling as the readiness signal
    ///
    /// Unlike the other queries this never errors: before initialization
    /// it reports zeroed counts with `ready: false` so callers can poll
    /// for readiness.
    pub fn stats(&self) -> DirectoryStats {
        match self.state.get() {
            Some(state) => state.index.stats(),
            None => DirectoryStats::default(),
        }
    }
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("csv_path", &self.csv_path)
            .field("ready", &self.is_ready())
            .finish()
    }
}
