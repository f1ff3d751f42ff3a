//! Command-line argument definitions for the pincode directory
//!
//! This module defines the complete CLI interface using the clap derive
//! API: directory queries (lookup, search, validate, stats) and the batch
//! address-resolution command.

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_DIGIPIN_ENDPOINT, DEFAULT_MATCH_ENDPOINT,
    DEFAULT_MATCH_TIMEOUT_SECS, DEFAULT_TOP_K, MIN_QUERY_LENGTH,
};
use crate::{Error, Result};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the pincode directory
///
/// Serves point lookups, searches and validation queries over the
/// All-India postal directory, and resolves batches of free-text
/// addresses through the external matching service.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pincode-directory",
    version,
    about = "Query the All-India postal directory and batch-resolve free-text addresses",
    long_about = "Loads the All-India postal directory into an in-memory index of delivery \
                  offices and serves pincode lookups, office/district/state searches and \
                  pincode-office validation. The batch command resolves a CSV of free-text \
                  addresses against the external matching service in bounded-concurrency chunks."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the pincode directory
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load the directory and print aggregate statistics
    Stats(StatsArgs),
    /// Look up all delivery offices for an exact 6-digit PIN code
    Lookup(LookupArgs),
    /// Search offices by name substring, or districts/states exactly
    Search(SearchArgs),
    /// Validate that a PIN code and office name belong together
    Validate(ValidateArgs),
    /// Resolve a CSV of free-text addresses through the matching service
    Batch(BatchArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Parser)]
pub struct CommonArgs {
    /// Path to the postal directory CSV file
    #[arg(
        short = 'i',
        long = "data",
        value_name = "FILE",
        default_value = "data/all_india_pincode_directory.csv",
        help = "Path to the postal directory CSV file"
    )]
    pub data_path: PathBuf,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

impl CommonArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && matches!(self.output_format, OutputFormat::Human)
    }
}

/// Arguments for the stats command
#[derive(Debug, Clone, Parser)]
pub struct StatsArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the lookup command
#[derive(Debug, Clone, Parser)]
pub struct LookupArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// The 6-digit PIN code to look up
    #[arg(value_name = "PINCODE")]
    pub pincode: String,

    /// Attach DIGIPIN location codes to the results
    #[arg(long = "digipin", help = "Attach DIGIPIN location codes to results")]
    pub digipin: bool,

    /// Base URL of the DIGIPIN encoding service
    #[arg(
        long = "digipin-endpoint",
        value_name = "URL",
        default_value = DEFAULT_DIGIPIN_ENDPOINT,
        help = "Base URL of the DIGIPIN encoding service"
    )]
    pub digipin_endpoint: String,
}

impl LookupArgs {
    /// Validate the lookup arguments
    pub fn validate(&self) -> Result<()> {
        if !crate::app::models::is_valid_pincode(&self.pincode) {
            return Err(Error::validation("PIN code must be exactly 6 digits"));
        }
        Ok(())
    }
}

/// Arguments for the search command
///
/// Exactly one of `--office`, `--district` or `--state` selects the
/// search field. Office search is substring containment; district and
/// state searches are exact matches.
#[derive(Debug, Clone, Parser)]
#[command(group(
    ArgGroup::new("field")
        .required(true)
        .args(["office", "district", "state"])
))]
pub struct SearchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Search office names by case-insensitive substring
    #[arg(long = "office", value_name = "QUERY")]
    pub office: Option<String>,

    /// List offices in a district (case-insensitive exact match)
    #[arg(long = "district", value_name = "NAME")]
    pub district: Option<String>,

    /// List offices in a state (case-insensitive exact match)
    #[arg(long = "state", value_name = "NAME")]
    pub state: Option<String>,

    /// Maximum number of results to return
    #[arg(short = 'l', long = "limit", value_name = "COUNT")]
    pub limit: Option<usize>,
}

impl SearchArgs {
    /// The query string for whichever field was selected
    pub fn query(&self) -> &str {
        self.office
            .as_deref()
            .or(self.district.as_deref())
            .or(self.state.as_deref())
            .unwrap_or("")
    }

    /// Validate the search arguments
    pub fn validate(&self) -> Result<()> {
        if self.query().trim().len() < MIN_QUERY_LENGTH {
            return Err(Error::validation(format!(
                "Search query must be at least {} characters long",
                MIN_QUERY_LENGTH
            )));
        }
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err(Error::validation("Limit must be greater than 0"));
            }
        }
        Ok(())
    }
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// The 6-digit PIN code to check
    #[arg(value_name = "PINCODE")]
    pub pincode: String,

    /// The office name expected at that PIN code
    #[arg(value_name = "OFFICE")]
    pub office_name: String,
}

impl ValidateArgs {
    /// Validate the validation-command arguments
    pub fn validate(&self) -> Result<()> {
        if self.office_name.trim().is_empty() {
            return Err(Error::validation("Both pincode and officename are required"));
        }
        if !crate::app::models::is_valid_pincode(&self.pincode) {
            return Err(Error::validation("PIN code must be exactly 6 digits"));
        }
        Ok(())
    }
}

/// Arguments for the batch command
#[derive(Debug, Clone, Parser)]
pub struct BatchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// CSV file of rows to resolve; each row needs an `address` column
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Rows resolved concurrently within one chunk
    #[arg(
        long = "chunk-size",
        value_name = "COUNT",
        default_value_t = DEFAULT_CHUNK_SIZE,
        help = "Rows resolved concurrently within one chunk"
    )]
    pub chunk_size: usize,

    /// Per-row matcher call timeout in seconds
    #[arg(
        long = "timeout-secs",
        value_name = "SECS",
        default_value_t = DEFAULT_MATCH_TIMEOUT_SECS,
        help = "Per-row matcher call timeout in seconds"
    )]
    pub timeout_secs: u64,

    /// Ranked candidates requested per address
    #[arg(
        long = "top-k",
        value_name = "COUNT",
        default_value_t = DEFAULT_TOP_K,
        help = "Ranked candidates requested per address"
    )]
    pub top_k: usize,

    /// Base URL of the address-matching service
    #[arg(
        long = "endpoint",
        value_name = "URL",
        default_value = DEFAULT_MATCH_ENDPOINT,
        help = "Base URL of the address-matching service"
    )]
    pub endpoint: String,
}

impl BatchArgs {
    /// Validate the batch arguments
    pub fn validate(&self) -> Result<()> {
        if !self.file.is_file() {
            return Err(Error::validation(format!(
                "Batch file does not exist: {}",
                self.file.display()
            )));
        }
        if self.chunk_size == 0 {
            return Err(Error::validation("Chunk size must be greater than 0"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::validation("Timeout must be greater than 0 seconds"));
        }
        if self.top_k == 0 {
            return Err(Error::validation("top-k must be greater than 0"));
        }
        Ok(())
    }
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Option<&Commands> {
        self.command.as_ref()
    }
}
