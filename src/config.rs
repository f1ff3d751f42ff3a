//! Configuration management and validation.
//!
//! Provides configuration structures for the directory dataset location,
//! query policy limits, batch resolution tuning, and the external service
//! endpoints consumed by the network clients.

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_DIGIPIN_ENDPOINT, DEFAULT_DIGIPIN_TIMEOUT_SECS,
    DEFAULT_MATCH_ENDPOINT, DEFAULT_MATCH_TIMEOUT_SECS, DEFAULT_REGION_LIMIT,
    DEFAULT_SEARCH_LIMIT, DEFAULT_TOP_K, MIN_QUERY_LENGTH,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Dataset location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the postal directory CSV file
    pub csv_path: PathBuf,
}

/// Query policy settings for the directory index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum accepted length for search queries
    pub min_query_length: usize,

    /// Result limit for office-name substring search
    pub search_limit: usize,

    /// Result limit for district and state lookups
    pub region_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: MIN_QUERY_LENGTH,
            search_limit: DEFAULT_SEARCH_LIMIT,
            region_limit: DEFAULT_REGION_LIMIT,
        }
    }
}

/// Batch resolution tuning
///
/// Chunk size bounds the number of concurrently outstanding resolver
/// calls; chunks themselves run strictly one after another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Rows resolved concurrently within one chunk
    pub chunk_size: usize,

    /// Per-row resolver call timeout in seconds
    pub match_timeout_secs: u64,

    /// Number of ranked candidates requested per address
    pub top_k: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            match_timeout_secs: DEFAULT_MATCH_TIMEOUT_SECS,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl BatchConfig {
    /// Per-row resolver timeout as a [`Duration`]
    pub fn match_timeout(&self) -> Duration {
        Duration::from_secs(self.match_timeout_secs)
    }
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Base URL of the address-matching service
    pub match_endpoint: String,

    /// Base URL of the DIGIPIN encoding service
    pub digipin_endpoint: String,

    /// DIGIPIN call timeout in seconds
    pub digipin_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            match_endpoint: DEFAULT_MATCH_ENDPOINT.to_string(),
            digipin_endpoint: DEFAULT_DIGIPIN_ENDPOINT.to_string(),
            digipin_timeout_secs: DEFAULT_DIGIPIN_TIMEOUT_SECS,
        }
    }
}

impl ServicesConfig {
    /// DIGIPIN call timeout as a [`Duration`]
    pub fn digipin_timeout(&self) -> Duration {
        Duration::from_secs(self.digipin_timeout_secs)
    }
}

/// Global configuration for the pincode directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dataset location settings
    pub data: DataConfig,

    /// Query policy settings
    pub search: SearchConfig,

    /// Batch resolution tuning
    pub batch: BatchConfig,

    /// External service endpoints
    pub services: ServicesConfig,
}

impl Config {
    /// Create a configuration pointing at the given dataset file
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            data: DataConfig {
                csv_path: csv_path.into(),
            },
            search: SearchConfig::default(),
            batch: BatchConfig::default(),
            services: ServicesConfig::default(),
        }
    }

    /// Create configuration with a custom batch chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.batch.chunk_size = chunk_size;
        self
    }

    /// Create configuration with a custom per-row resolver timeout
    pub fn with_match_timeout_secs(mut self, secs: u64) -> Self {
        self.batch.match_timeout_secs = secs;
        self
    }

    /// Create configuration with a custom candidate count per address
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.batch.top_k = top_k;
        self
    }

    /// Create configuration with a custom matcher endpoint
    pub fn with_match_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.services.match_endpoint = endpoint.into();
        self
    }

    /// Create configuration with a custom DIGIPIN endpoint
    pub fn with_digipin_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.services.digipin_endpoint = endpoint.into();
        self
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.batch.chunk_size == 0 {
            return Err(Error::configuration(
                "Batch chunk size must be greater than 0".to_string(),
            ));
        }

        if self.batch.match_timeout_secs == 0 {
            return Err(Error::configuration(
                "Match timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.batch.top_k == 0 {
            return Err(Error::configuration(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if self.search.min_query_length == 0 {
            return Err(Error::configuration(
                "Minimum query length must be greater than 0".to_string(),
            ));
        }

        if self.services.match_endpoint.trim().is_empty() {
            return Err(Error::configuration(
                "Match service endpoint cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
