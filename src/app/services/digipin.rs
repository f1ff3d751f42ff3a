//! Client for the DIGIPIN geocoding service
//!
//! DIGIPIN encodes a latitude/longitude pair into a short opaque location
//! code used for fine-grained delivery-point identification. The service
//! is best-effort: any failure degrades to an absent code rather than
//! failing the surrounding response.

use crate::app::models::PostalRecord;
use crate::Result;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Serialize)]
struct EncodeRequest {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct EncodeResponse {
    #[serde(default)]
    digipin: Option<String>,
}

#[derive(Debug, Serialize)]
struct DecodeRequest<'a> {
    digipin: &'a str,
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    latitude: f64,
    longitude: f64,
}

/// HTTP client for the DIGIPIN encoding service
#[derive(Debug, Clone)]
pub struct DigipinClient {
    client: reqwest::Client,
    base_url: String,
}

impl DigipinClient {
    /// Create a client for the DIGIPIN service at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Encode coordinates into a DIGIPIN code
    ///
    /// Returns `None` when the service is unavailable or replies without
    /// a code; callers keep working without the field.
    pub async fn encode(&self, latitude: f64, longitude: f64) -> Option<String> {
        let url = format!("{}/api/digipin/encode", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EncodeRequest {
                latitude,
                longitude,
            })
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<EncodeResponse>().await {
                    Ok(body) => body.digipin,
                    Err(e) => {
                        warn!("Invalid DIGIPIN encode response: {}", e);
                        None
                    }
                }
            }
            Ok(response) => {
                warn!("DIGIPIN encode returned {}", response.status());
                None
            }
            Err(e) => {
                warn!("DIGIPIN encode error: {}", e);
                None
            }
        }
    }

    /// Decode a DIGIPIN code back into coordinates
    pub async fn decode(&self, digipin: &str) -> Option<(f64, f64)> {
        let url = format!("{}/api/digipin/decode", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&DecodeRequest { digipin })
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<DecodeResponse>().await {
                    Ok(body) => Some((body.latitude, body.longitude)),
                    Err(e) => {
                        warn!("Invalid DIGIPIN decode response: {}", e);
                        None
                    }
                }
            }
            Ok(response) => {
                warn!("DIGIPIN decode returned {}", response.status());
                None
            }
            Err(e) => {
                warn!("DIGIPIN decode error: {}", e);
                None
            }
        }
    }
}

/// A postal record augmented with its DIGIPIN code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedRecord {
    #[serde(flatten)]
    pub record: PostalRecord,

    /// Absent when the DIGIPIN service could not produce a code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digipin: Option<String>,
}

/// Attach DIGIPIN codes to a set of looked-up records
///
/// Codes are fetched concurrently, one call per record; a failed call
/// leaves that record's code absent without affecting the others.
pub async fn attach_digipin(records: &[&PostalRecord], client: &DigipinClient) -> Vec<LocatedRecord> {
    let codes = join_all(
        records
            .iter()
            .map(|record| client.encode(record.latitude, record.longitude)),
    )
    .await;

    records
        .iter()
        .zip(codes)
        .map(|(record, digipin)| LocatedRecord {
            record: (*record).clone(),
            digipin,
        })
        .collect()
}
