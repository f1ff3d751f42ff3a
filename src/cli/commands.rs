//! Command implementations for the pincode directory CLI
//!
//! This module contains the command execution logic: logging setup,
//! directory initialization, query dispatch, and human/JSON output.

use crate::app::models::PostalRecord;
use crate::app::services::batch_resolver::{BatchOptions, BatchReport, BatchResolver, InputRow};
use crate::app::services::digipin::{DigipinClient, LocatedRecord, attach_digipin};
use crate::app::services::directory::Directory;
use crate::app::services::match_client::HttpMatchClient;
use crate::cli::args::{
    Args, BatchArgs, Commands, CommonArgs, LookupArgs, OutputFormat, SearchArgs, StatsArgs,
    ValidateArgs,
};
use crate::constants::{DEFAULT_REGION_LIMIT, DEFAULT_SEARCH_LIMIT};
use crate::{Config, Error, Result};
use colored::Colorize;
use std::fs::File;
use std::sync::Arc;
use tracing::{debug, info};

/// Main command runner for the pincode directory CLI
///
/// Sets up logging from the shared flags, then dispatches to the
/// selected command.
pub async fn run(args: Args) -> Result<()> {
    let command = args
        .command
        .ok_or_else(|| Error::configuration("No command specified"))?;

    let common = match &command {
        Commands::Stats(a) => a.common.clone(),
        Commands::Lookup(a) => a.common.clone(),
        Commands::Search(a) => a.common.clone(),
        Commands::Validate(a) => a.common.clone(),
        Commands::Batch(a) => a.common.clone(),
    };

    setup_logging(&common);
    debug!("Command: {:?}", command);

    match command {
        Commands::Stats(args) => run_stats(args).await,
        Commands::Lookup(args) => run_lookup(args).await,
        Commands::Search(args) => run_search(args).await,
        Commands::Validate(args) => run_validate(args).await,
        Commands::Batch(args) => run_batch(args).await,
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(common: &CommonArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = common.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pincode_directory={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Build and initialize the directory for a query command
async fn initialize_directory(config: &Config, common: &CommonArgs) -> Result<Directory> {
    let directory = Directory::new(config.data.csv_path.clone());
    directory.initialize(common.show_progress()).await?;
    Ok(directory)
}

async fn run_stats(args: StatsArgs) -> Result<()> {
    let config = Config::new(args.common.data_path.clone());
    config.validate()?;
    let directory = initialize_directory(&config, &args.common).await?;
    let stats = directory.stats();

    match args.common.output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Human => {
            println!("{}", "Postal Directory Statistics".bold());
            println!("  Records:   {}", stats.total_records);
            println!("  Pincodes:  {}", stats.unique_pincodes);
            println!("  Offices:   {}", stats.unique_offices);
            println!("  Districts: {}", stats.unique_districts);
            println!("  States:    {}", stats.unique_states);
            if let Some(load_stats) = directory.load_stats() {
                println!("  {}", load_stats.summary().dimmed());
            }
        }
    }

    Ok(())
}

async fn run_lookup(args: LookupArgs) -> Result<()> {
    args.validate()?;

    let config = Config::new(args.common.data_path.clone())
        .with_digipin_endpoint(&args.digipin_endpoint);
    config.validate()?;

    let directory = initialize_directory(&config, &args.common).await?;
    let offices = directory.by_pincode(&args.pincode)?;

    if offices.is_empty() {
        return Err(Error::not_found(format!(
            "No post offices found for PIN code {}",
            args.pincode
        )));
    }

    info!("Found {} offices for {}", offices.len(), args.pincode);

    if args.digipin {
        let client = DigipinClient::new(
            &config.services.digipin_endpoint,
            config.services.digipin_timeout(),
        )?;
        let located = attach_digipin(&offices, &client).await;
        print_located_records(&located, args.common.output_format)?;
    } else {
        print_records(&offices, args.common.output_format)?;
    }

    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    args.validate()?;

    let config = Config::new(args.common.data_path.clone());
    config.validate()?;
    let directory = initialize_directory(&config, &args.common).await?;

    let results = if let Some(query) = &args.office {
        directory.search_offices(query, args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))?
    } else if let Some(district) = &args.district {
        let results = directory.by_district(district, args.limit.unwrap_or(DEFAULT_REGION_LIMIT))?;
        if results.is_empty() {
            return Err(Error::not_found(format!(
                "No post offices found in district: {}",
                district
            )));
        }
        results
    } else if let Some(state) = &args.state {
        let results = directory.by_state(state, args.limit.unwrap_or(DEFAULT_REGION_LIMIT))?;
        if results.is_empty() {
            return Err(Error::not_found(format!(
                "No post offices found in state: {}",
                state
            )));
        }
        results
    } else {
        // clap's arg group guarantees one field is present
        Vec::new()
    };

    if matches!(args.common.output_format, OutputFormat::Human) {
        println!(
            "{} result(s) for '{}'",
            results.len().to_string().bold(),
            args.query()
        );
    }
    print_records(&results, args.common.output_format)?;

    Ok(())
}

async fn run_validate(args: ValidateArgs) -> Result<()> {
    args.validate()?;

    let config = Config::new(args.common.data_path.clone());
    config.validate()?;
    let directory = initialize_directory(&config, &args.common).await?;
    let outcome = directory.validate_pin_office(&args.pincode, &args.office_name)?;

    match args.common.output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Human => {
            if outcome.valid {
                let office = outcome.office.as_ref().map(|o| o.office_name.as_str());
                println!(
                    "{} {} is a valid office for PIN code {}",
                    "VALID".green().bold(),
                    office.unwrap_or(&args.office_name),
                    args.pincode
                );
            } else {
                println!(
                    "{} {}",
                    "INVALID".red().bold(),
                    outcome.message.as_deref().unwrap_or("")
                );
                if let Some(available) = &outcome.available_offices {
                    println!("Valid offices for {}:", args.pincode);
                    for office in available {
                        println!("  - {}", office);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn run_batch(args: BatchArgs) -> Result<()> {
    args.validate()?;

    let file = File::open(&args.file)
        .map_err(|e| Error::io(format!("Failed to open batch file {}", args.file.display()), e))?;
    let rows = InputRow::read_rows(file)?;

    if rows.iter().all(|row| row.address().is_none()) {
        return Err(Error::validation(
            "No valid addresses found in CSV. CSV must have an \"address\" column.",
        ));
    }

    let config = Config::new(args.common.data_path.clone())
        .with_chunk_size(args.chunk_size)
        .with_match_timeout_secs(args.timeout_secs)
        .with_top_k(args.top_k)
        .with_match_endpoint(&args.endpoint);
    config.validate()?;

    let client = HttpMatchClient::new(
        &config.services.match_endpoint,
        config.batch.match_timeout(),
    )?;
    let resolver =
        BatchResolver::with_options(Arc::new(client), BatchOptions::from(&config.batch));

    let report = resolver.process(rows).await;
    print_batch_report(&report, args.common.output_format)?;

    Ok(())
}

fn print_records(records: &[&PostalRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Human => {
            for record in records {
                println!(
                    "{}  {} {}  {}, {} ({:.4}, {:.4})",
                    record.pincode.cyan().bold(),
                    record.office_name.green(),
                    record.office_type.dimmed(),
                    record.district,
                    record.state,
                    record.latitude,
                    record.longitude
                );
            }
        }
    }
    Ok(())
}

fn print_located_records(records: &[LocatedRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Human => {
            for located in records {
                let record = &located.record;
                println!(
                    "{}  {} {}  {}, {} ({:.4}, {:.4})  digipin: {}",
                    record.pincode.cyan().bold(),
                    record.office_name.green(),
                    record.office_type.dimmed(),
                    record.district,
                    record.state,
                    record.latitude,
                    record.longitude,
                    located.digipin.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn print_batch_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Human => {
            let summary = &report.summary;
            println!("{}", "Batch Resolution Summary".bold());
            println!("  Total:      {}", summary.total);
            println!("  Successful: {}", summary.successful.to_string().green());
            println!("  No match:   {}", summary.no_match.to_string().yellow());
            println!("  Errors:     {}", summary.errors.to_string().red());
            if !report.format_errors.is_empty() {
                println!(
                    "  Format errors (missing address): {}",
                    report.format_errors.len().to_string().red()
                );
            }
            println!("{}", serde_json::to_string_pretty(&report.results)?);
        }
    }
    Ok(())
}
