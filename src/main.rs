use clap::Parser;
use ssim_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                let reason = match signal {
                    Ok(()) => "Processing interrupted by user".to_string(),
                    Err(e) => format!("Failed to listen for CTRL+C: {}", e),
                };
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(ssim_processor::Error::processing_interrupted(reason))
            }
        }
    });

    match result {
        // Partial failures were already reported in the summary
        Ok(stats) if stats.has_failures() => process::exit(2),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("SSIM Processor - IATA schedule message expander");
    println!("===============================================");
    println!();
    println!("Expand SIR slot messages, SIM schedule data sets and CSV schedule exports");
    println!("into one flight per operating day, written as CSV, Parquet or JSON.");
    println!();
    println!("USAGE:");
    println!("    ssim-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    convert     Expand schedule files into flight files");
    println!("    inspect     Show format, header, footer and diagnostics of one file");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Convert a SIR message to CSV next to the input:");
    println!("    ssim-processor convert W17_LHR.sir");
    println!();
    println!("    # Convert a directory of SIM files to Parquet, keeping Heathrow legs only:");
    println!("    ssim-processor convert schedules/ -o out/ -f parquet -a LHR");
    println!();
    println!("    # Inspect a file as JSON:");
    println!("    ssim-processor inspect W17_LHR.sir --format json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    ssim-processor <COMMAND> --help");
}
