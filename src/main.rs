use clap::Parser;
use pincode_directory::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
        };

        tokio::select! {
            result = commands::run(args) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(pincode_directory::Error::interrupted(
                    "Processing interrupted by user".to_string()
                ))
            }
        }
    });

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Pincode Directory - All-India Postal Directory Service");
    println!("======================================================");
    println!();
    println!("Load the All-India postal directory into an in-memory index and query it,");
    println!("or resolve batches of free-text addresses via the matching service.");
    println!();
    println!("USAGE:");
    println!("    pincode-directory <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    stats       Load the directory and print aggregate statistics");
    println!("    lookup      Look up all delivery offices for a 6-digit PIN code");
    println!("    search      Search offices by name substring, or districts/states exactly");
    println!("    validate    Validate that a PIN code and office name belong together");
    println!("    batch       Resolve a CSV of free-text addresses in bounded chunks");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Look up a PIN code with DIGIPIN codes attached:");
    println!("    pincode-directory lookup 504273 --digipin");
    println!();
    println!("    # Substring search across office names:");
    println!("    pincode-directory search --office kothimir --limit 20");
    println!();
    println!("    # Resolve an uploaded CSV of addresses:");
    println!("    pincode-directory batch addresses.csv --chunk-size 10 --top-k 3");
    println!();
    println!("For detailed help on any command, use:");
    println!("    pincode-directory <COMMAND> --help");
}
