//! Chunked batch resolution of address rows
//!
//! This module orchestrates bulk resolution of uploaded address rows
//! against the external matcher. Rows are processed in fixed-size chunks:
//! chunks run strictly one after another, which bounds the number of
//! concurrently outstanding matcher calls to the chunk size, while the
//! rows inside a chunk fan out concurrently. Every call settles on its
//! own; one row's failure never cancels or fails its siblings.

use crate::app::services::match_client::MatchClient;
use crate::config::BatchConfig;
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_MATCH_TIMEOUT_SECS, DEFAULT_TOP_K};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

pub mod report;

pub use report::{BatchReport, BatchSummary, FormatError, InputRow, OutcomeStatus, RowOutcome};

/// Tuning for one batch job
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Rows resolved concurrently within one chunk
    pub chunk_size: usize,

    /// Timeout applied to each individual matcher call
    pub item_timeout: Duration,

    /// Ranked candidates requested per address
    pub top_k: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            item_timeout: Duration::from_secs(DEFAULT_MATCH_TIMEOUT_SECS),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            item_timeout: config.match_timeout(),
            top_k: config.top_k,
        }
    }
}

/// Resolves batches of address rows through a [`MatchClient`]
pub struct BatchResolver<C> {
    client: Arc<C>,
    options: BatchOptions,
}

impl<C: MatchClient> BatchResolver<C> {
    /// Create a resolver with default options
    pub fn new(client: Arc<C>) -> Self {
        Self::with_options(client, BatchOptions::default())
    }

    /// Create a resolver with explicit options
    pub fn with_options(client: Arc<C>, options: BatchOptions) -> Self {
        Self { client, options }
    }

    /// The options this resolver runs with
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Resolve a batch of uploaded rows
    ///
    /// Rows without an address are diverted into the report's
    /// format-error bucket and never reach the matcher; they are excluded
    /// from the summary's `total`. Valid rows keep their upload order in
    /// `results`. There are no retries: a row that lands in `error` stays
    /// there until the caller resubmits it.
    pub async fn process(&self, rows: Vec<InputRow>) -> BatchReport {
        let received = rows.len();

        // Validation: divert rows without an address before any network call
        let mut valid: Vec<(InputRow, String)> = Vec::new();
        let mut format_errors = Vec::new();
        for row in rows {
            match row.address() {
                Some(address) => {
                    let address = address.to_string();
                    valid.push((row, address));
                }
                None => format_errors.push(FormatError::missing_address(row)),
            }
        }

        info!(
            "Batch job: {} rows received, {} valid, {} format errors (chunk size {})",
            received,
            valid.len(),
            format_errors.len(),
            self.options.chunk_size
        );

        let mut results = Vec::with_capacity(valid.len());
        let total_chunks = valid.len().div_ceil(self.options.chunk_size.max(1));

        // Chunks run strictly sequentially; rows within a chunk fan out.
        // join_all preserves row order and waits for every call to settle.
        for (chunk_index, chunk) in valid.chunks(self.options.chunk_size.max(1)).enumerate() {
            debug!(
                "Resolving chunk {}/{} ({} rows)",
                chunk_index + 1,
                total_chunks,
                chunk.len()
            );

            let outcomes = join_all(
                chunk
                    .iter()
                    .map(|(row, address)| self.resolve_row(row, address)),
            )
            .await;

            results.extend(outcomes);
        }

        let summary = BatchSummary::from_outcomes(&results);
        info!(
            "Batch job complete: {} total, {} successful, {} no_match, {} errors",
            summary.total, summary.successful, summary.no_match, summary.errors
        );

        BatchReport {
            summary,
            results,
            format_errors,
            completed_at: Utc::now(),
        }
    }

    /// Resolve one row, converting every failure into an outcome
    ///
    /// The per-row timeout bounds this call alone; an elapsed timer or a
    /// client error becomes this row's `error` outcome while the rest of
    /// the chunk keeps going.
    async fn resolve_row(&self, row: &InputRow, address: &str) -> RowOutcome {
        match timeout(
            self.options.item_timeout,
            self.client.match_address(address, self.options.top_k),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.matches.is_empty() {
                    RowOutcome::no_match(row.clone())
                } else {
                    RowOutcome::success(row.clone(), response.matches)
                }
            }
            Ok(Err(e)) => RowOutcome::error(row.clone(), e.to_string()),
            Err(_) => RowOutcome::error(
                row.clone(),
                format!(
                    "Match call timed out after {}s",
                    self.options.item_timeout.as_secs()
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::match_client::{MatchCandidate, MatchResponse};
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted matcher driven by the address text:
    /// "fail ..." errors, "empty ..." returns no candidates,
    /// "slow ..." sleeps past any test timeout, anything else matches.
    struct ScriptedClient {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            })
        }

        fn candidate(address: &str) -> MatchCandidate {
            MatchCandidate {
                officename: format!("{} B.O", address),
                pincode: "504273".to_string(),
                district: "Kumuram Bheem Asifabad".to_string(),
                statename: "TELANGANA".to_string(),
                confidence: 0.9,
                latitude: Some(19.17),
                longitude: Some(79.28),
                digipin: None,
            }
        }
    }

    #[async_trait]
    impl MatchClient for ScriptedClient {
        async fn match_address(&self, text: &str, _top_k: usize) -> Result<MatchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            // Let sibling calls in the chunk overlap
            tokio::time::sleep(Duration::from_millis(10)).await;

            if text.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if text.starts_with("fail") {
                return Err(Error::upstream("matcher exploded"));
            }
            if text.starts_with("empty") {
                return Ok(MatchResponse::default());
            }
            Ok(MatchResponse {
                query: text.to_string(),
                normalized: None,
                matches: vec![Self::candidate(text)],
            })
        }
    }

    fn row(address: &str) -> InputRow {
        InputRow::from_pairs([("name", "row"), ("address", address)])
    }

    fn quick_options(chunk_size: usize) -> BatchOptions {
        BatchOptions {
            chunk_size,
            item_timeout: Duration::from_secs(2),
            top_k: 1,
        }
    }

    #[tokio::test]
    async fn test_summary_counts_only_valid_rows() {
        let client = ScriptedClient::new();
        let resolver = BatchResolver::with_options(client.clone(), quick_options(10));

        let rows = vec![
            row("kothimir village"),
            row("empty nowhere"),
            InputRow::from_pairs([("name", "no-address")]),
        ];

        let report = resolver.process(rows).await;

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.successful, 1);
        assert_eq!(report.summary.no_match, 1);
        assert_eq!(report.summary.errors, 0);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.format_errors.len(), 1);
        assert_eq!(report.format_errors[0].error, "Missing address column");
        // Only the two valid rows reached the matcher
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_chunk_isolation_one_failure_leaves_siblings_intact() {
        let client = ScriptedClient::new();
        let resolver = BatchResolver::with_options(client, quick_options(10));

        let rows: Vec<InputRow> = (0..10)
            .map(|i| {
                if i == 4 {
                    row("fail this one")
                } else {
                    row(&format!("village {}", i))
                }
            })
            .collect();

        let report = resolver.process(rows).await;

        assert_eq!(report.summary.total, 10);
        assert_eq!(report.summary.successful, 9);
        assert_eq!(report.summary.errors, 1);

        // Upload order preserved; only row 4 carries the error
        for (i, outcome) in report.results.iter().enumerate() {
            if i == 4 {
                assert_eq!(outcome.status, OutcomeStatus::Error);
                assert!(outcome.error.as_deref().unwrap().contains("matcher exploded"));
            } else {
                assert_eq!(outcome.status, OutcomeStatus::Success);
                assert!(outcome.matched_data.as_ref().unwrap().len() == 1);
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_converts_single_row_to_error() {
        let client = ScriptedClient::new();
        let resolver = BatchResolver::with_options(
            client,
            BatchOptions {
                chunk_size: 5,
                item_timeout: Duration::from_millis(100),
                top_k: 1,
            },
        );

        let rows = vec![row("village a"), row("slow boat"), row("village b")];
        let report = resolver.process(rows).await;

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.successful, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.results[1].status, OutcomeStatus::Error);
        assert!(report.results[1].error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_concurrency_bounded_by_chunk_size() {
        let client = ScriptedClient::new();
        let resolver = BatchResolver::with_options(client.clone(), quick_options(3));

        let rows: Vec<InputRow> = (0..9).map(|i| row(&format!("village {}", i))).collect();
        let report = resolver.process(rows).await;

        assert_eq!(report.summary.successful, 9);
        let max = client.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "outstanding calls exceeded chunk size: {}", max);
        assert!(max >= 2, "rows inside a chunk should overlap, saw {}", max);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let client = ScriptedClient::new();
        let resolver = BatchResolver::new(client.clone());

        let report = resolver.process(Vec::new()).await;

        assert_eq!(report.summary, BatchSummary::default());
        assert!(report.results.is_empty());
        assert!(report.format_errors.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_options_from_config() {
        let config = BatchConfig {
            chunk_size: 20,
            match_timeout_secs: 7,
            top_k: 3,
        };
        let options = BatchOptions::from(&config);
        assert_eq!(options.chunk_size, 20);
        assert_eq!(options.item_timeout, Duration::from_secs(7));
        assert_eq!(options.top_k, 3);
    }
}
