//! Client for the external address-matching service
//!
//! The matcher turns free-text addresses into ranked post-office
//! candidates with confidence scores. It is reached over a narrow network
//! call; everything else about it (embeddings, OCR, normalization) stays
//! on the other side of the wire.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One ranked candidate returned by the matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    #[serde(default)]
    pub officename: String,

    #[serde(default)]
    pub pincode: String,

    #[serde(default)]
    pub district: String,

    #[serde(default)]
    pub statename: String,

    /// Matcher confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Opaque location code attached by the matcher, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digipin: Option<String>,
}

/// Matcher reply for one address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    /// The query text as the matcher received it
    #[serde(default)]
    pub query: String,

    /// Normalized form of the query, when the matcher reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,

    /// Ranked candidates, best first; empty means no match
    #[serde(default)]
    pub matches: Vec<MatchCandidate>,
}

/// Seam for address resolution
///
/// Production code uses [`HttpMatchClient`]; tests substitute scripted
/// implementations to drive the batch pipeline deterministically.
#[async_trait]
pub trait MatchClient: Send + Sync {
    /// Resolve one free-text address to ranked candidates
    async fn match_address(&self, text: &str, top_k: usize) -> Result<MatchResponse>;
}

#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    text: &'a str,
    top_k: usize,
    include_digipin: bool,
}

/// HTTP client for the address-matching service
#[derive(Debug, Clone)]
pub struct HttpMatchClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMatchClient {
    /// Create a client for the matcher at `base_url`
    ///
    /// The timeout is request-scoped: it bounds every individual call
    /// issued through this client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MatchClient for HttpMatchClient {
    async fn match_address(&self, text: &str, top_k: usize) -> Result<MatchResponse> {
        let url = format!("{}/api/ml/match", self.base_url);
        debug!("Matching address via {} (top_k: {})", url, top_k);

        let response = self
            .client
            .post(&url)
            .json(&MatchRequest {
                text,
                top_k,
                include_digipin: true,
            })
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Match service unavailable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!(
                "Match service returned {}: {}",
                status,
                body.trim()
            )));
        }

        response
            .json::<MatchResponse>()
            .await
            .map_err(|e| Error::upstream(format!("Invalid match service response: {}", e)))
    }
}
