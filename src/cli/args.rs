//! Command-line argument definitions for the SSIM processor
//!
//! Uses the clap derive API. `convert` expands schedule files into flight
//! files and `inspect` reports what the reader made of a single file.

use crate::app::models::Season;
use crate::config::{OutputFormat, TextEncoding};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Worker ceiling accepted on the command line
const MAX_WORKERS: usize = 256;

/// CLI arguments for the SSIM schedule processor
///
/// Reads IATA SSIM-family schedule messages (SIR, SIM and the CSV export)
/// and expands their recurring slots into one row per operating day.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ssim-processor",
    version,
    about = "Expand IATA SSIM schedule messages into individual dated flights",
    long_about = "Reads SIR slot clearance messages, SIM fixed-column schedule data sets and \
                  the semicolon-separated CSV export, resolves their season-relative dates and \
                  expands every recurring slot into one flight per operating day. Output is \
                  written as CSV, Parquet or JSON."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Expand schedule files into flight files
    Convert(ConvertArgs),
    /// Show the format, header, footer and diagnostics of one schedule file
    Inspect(InspectArgs),
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Schedule files or directories to convert
    ///
    /// Directories are searched recursively for files matching the
    /// configured file patterns.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for output files
    ///
    /// Created if missing. Without it each output is written next to its input.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file format (csv, parquet, json)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Reference airport (IATA code)
    ///
    /// Overrides the SIR clearance airport and keeps only the SIM legs that
    /// depart from or arrive at this airport.
    #[arg(short = 'a', long = "airport", value_name = "CODE")]
    pub airport: Option<String>,

    /// Input text encoding (utf-8, utf-8-lossy, latin-1)
    #[arg(short = 'e', long = "encoding", value_name = "ENCODING")]
    pub encoding: Option<TextEncoding>,

    /// Season used for open start/end-of-season bounds, e.g. W17
    #[arg(short = 's', long = "season", value_name = "SEASON")]
    pub season: Option<Season>,

    /// Century prefix for two-digit years
    #[arg(long = "year-prefix", value_name = "DIGITS")]
    pub year_prefix: Option<String>,

    /// Leave the raw source line out of the output
    #[arg(long = "no-raw")]
    pub no_raw: bool,

    /// Overwrite existing output files
    #[arg(long = "force")]
    pub force_overwrite: bool,

    /// Path to configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of files converted concurrently
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Format of the run summary
    #[arg(long = "report", value_enum, default_value = "human")]
    pub report: ReportFormat,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Schedule file to inspect
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Reference airport (IATA code)
    #[arg(short = 'a', long = "airport", value_name = "CODE")]
    pub airport: Option<String>,

    /// Input text encoding (utf-8, utf-8-lossy, latin-1)
    #[arg(short = 'e', long = "encoding", value_name = "ENCODING")]
    pub encoding: Option<TextEncoding>,

    /// Season used for open start/end-of-season bounds, e.g. W17
    #[arg(short = 's', long = "season", value_name = "SEASON")]
    pub season: Option<Season>,

    /// Path to configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of diagnostics listed in human output
    #[arg(long = "limit", value_name = "COUNT", default_value_t = 20)]
    pub limit: usize,

    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: ReportFormat,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Presentation of command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable output
    Human,
    /// JSON for scripting
    Json,
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl ConvertArgs {
    /// Validate the convert arguments for consistency
    pub fn validate(&self) -> Result<()> {
        for input in &self.inputs {
            if !input.exists() {
                return Err(Error::file_not_found(input.display().to_string()));
            }
        }

        if let Some(output_dir) = &self.output_dir {
            if output_dir.is_file() {
                return Err(Error::configuration(format!(
                    "Output path is a file, expected a directory: {}",
                    output_dir.display()
                )));
            }
        }

        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Err(Error::configuration(format!(
                    "Number of workers must be between 1 and {}",
                    MAX_WORKERS
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Progress bars are hidden in quiet mode and for JSON reports
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.report == ReportFormat::Human
    }
}

impl InspectArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.input.is_file() {
            return Err(Error::file_not_found(self.input.display().to_string()));
        }
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}
