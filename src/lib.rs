//! Pincode Directory Library
//!
//! A Rust library for serving the All-India postal directory: loading and
//! indexing post-office records for fast in-memory lookups, and resolving
//! free-text addresses in bulk against an external matching service.
//!
//! This library provides tools for:
//! - Streaming the postal directory CSV with row normalization and filtering
//! - Indexing delivery offices by pincode, office name, district and state
//! - Exact, substring and validation queries against the built index
//! - Chunked, bounded-concurrency batch resolution of address rows with
//!   per-row failure isolation
//! - Narrow network clients for the address matcher and DIGIPIN encoder

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod batch_resolver;
        pub mod digipin;
        pub mod directory;
        pub mod match_client;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{DeliveryStatus, PostalRecord};
pub use app::services::directory::Directory;
pub use config::Config;

/// Result type alias for directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for directory and batch-resolution operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The backing dataset is missing or unreadable at startup
    #[error("Postal dataset unavailable: {path}")]
    SourceUnavailable { path: String },

    /// CSV read/parsing failure while streaming the dataset
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// A query was issued before the index finished building
    #[error("Postal directory is not initialized yet")]
    NotInitialized,

    /// Caller-supplied input failed validation
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A well-formed key matched no records
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The external matcher or geocoder failed or timed out
    #[error("Upstream service error: {message}")]
    Upstream { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

impl Error {
    /// Create a source-unavailable error for a dataset path
    pub fn source_unavailable(path: impl Into<String>) -> Self {
        Self::SourceUnavailable { path: path.into() }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an upstream service error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a processing-interrupted error
    pub fn interrupted(reason: impl Into<String>) -> Self {
        Self::Interrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Upstream {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Configuration {
            message: format!("Failed to serialize output: {}", error),
        }
    }
}
