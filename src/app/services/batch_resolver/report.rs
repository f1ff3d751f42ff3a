//! Batch job row and outcome types
//!
//! Input rows are arbitrary named-column records carried through the
//! pipeline verbatim; outcomes merge the typed resolution result into the
//! row's fields when serialized, so callers can correlate results with
//! their upload by any column they sent.

use crate::app::services::match_client::MatchCandidate;
use crate::constants::ADDRESS_COLUMN;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::io;

/// One uploaded row: an ordered mapping of column name to value
///
/// Column order is preserved exactly as extracted so that serialized
/// outcomes list the caller's fields in their original order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputRow {
    fields: Vec<(String, String)>,
}

impl InputRow {
    /// Build a row from (column, value) pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a column value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The row's address, when present and non-empty after trimming
    pub fn address(&self) -> Option<&str> {
        self.get(ADDRESS_COLUMN)
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// The row's columns in upload order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Extract rows from CSV content
    ///
    /// This is plain row extraction: headers become column names, values
    /// are carried as-is. Short rows are padded with empty values so a
    /// ragged upload still yields one row per line.
    pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<InputRow>> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.to_string(), record.get(i).unwrap_or("").to_string()))
                .collect();
            rows.push(InputRow { fields });
        }

        Ok(rows)
    }
}

impl Serialize for InputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Tag for a resolved row's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The resolver returned at least one candidate
    Success,
    /// The resolver returned zero candidates
    NoMatch,
    /// The resolver call failed or timed out
    Error,
}

impl OutcomeStatus {
    /// Wire label for the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoMatch => "no_match",
            Self::Error => "error",
        }
    }
}

/// A resolved row: passthrough fields plus the typed outcome
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// The original row, untouched
    pub row: InputRow,

    /// Outcome tag for this row
    pub status: OutcomeStatus,

    /// Ranked candidates on success, `None` otherwise
    pub matched_data: Option<Vec<MatchCandidate>>,

    /// Captured failure message on error
    pub error: Option<String>,
}

impl RowOutcome {
    /// Build a success outcome carrying the resolver's candidates
    pub fn success(row: InputRow, matches: Vec<MatchCandidate>) -> Self {
        Self {
            row,
            status: OutcomeStatus::Success,
            matched_data: Some(matches),
            error: None,
        }
    }

    /// Build a no-match outcome
    pub fn no_match(row: InputRow) -> Self {
        Self {
            row,
            status: OutcomeStatus::NoMatch,
            matched_data: None,
            error: None,
        }
    }

    /// Build an error outcome with the captured message
    pub fn error(row: InputRow, message: impl Into<String>) -> Self {
        Self {
            row,
            status: OutcomeStatus::Error,
            matched_data: None,
            error: Some(message.into()),
        }
    }
}

// Serialized as a single flat object: the caller's columns in upload
// order, then the outcome fields merged in.
impl Serialize for RowOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let extra = if self.error.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(self.row.fields().len() + extra))?;
        for (key, value) in self.row.fields() {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("matched_data", &self.matched_data)?;
        map.serialize_entry("status", self.status.as_str())?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}

/// A row rejected before resolution for lacking an address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatError {
    /// The offending row, untouched
    pub row: InputRow,

    /// Why the row was rejected
    pub error: String,
}

impl FormatError {
    /// Build the standard missing-address format error
    pub fn missing_address(row: InputRow) -> Self {
        Self {
            row,
            error: "Missing address column".to_string(),
        }
    }
}

/// Per-tag counts over a completed batch job
///
/// `total` counts only rows that passed address validation, so
/// `successful + no_match + errors == total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub no_match: usize,
    pub errors: usize,
}

impl BatchSummary {
    /// Tally outcomes into a summary
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Success => summary.successful += 1,
                OutcomeStatus::NoMatch => summary.no_match += 1,
                OutcomeStatus::Error => summary.errors += 1,
            }
        }
        summary
    }
}

/// Full result of a batch job
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-tag counts over the resolved rows
    pub summary: BatchSummary,

    /// One outcome per valid row, in upload order
    pub results: Vec<RowOutcome>,

    /// Rows rejected before resolution, excluded from the summary
    pub format_errors: Vec<FormatError>,

    /// When the job finished
    pub completed_at: DateTime<Utc>,
}
