//! Shared components for CLI commands
//!
//! Logging setup, configuration loading, input discovery, output naming and
//! progress reporting used by both `convert` and `inspect`.

use crate::config::{Config, OutputFormat};
use crate::constants::{PROGRESS_TEMPLATE, SPINNER_TEMPLATE};
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Suffix added to the input stem to name its flight file
const OUTPUT_SUFFIX: &str = "_flights";

/// Statistics of a command run, reported at the end
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    /// Files read and written without error
    pub files_processed: usize,
    /// Files that failed as a whole
    pub files_failed: usize,
    /// Canonical slots built across all files
    pub slots_read: usize,
    /// Flights produced by expansion
    pub flights_written: usize,
    /// Line, record and expansion diagnostics across all files
    pub diagnostics: usize,
    #[serde(serialize_with = "serialize_seconds")]
    pub processing_time: Duration,
    /// Output file names with their sizes in bytes
    pub output_sizes: Vec<(String, u64)>,
    /// Input files that failed with the reason
    pub failures: Vec<(String, String)>,
}

fn serialize_seconds<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl ConversionStats {
    /// Calculate total output size in bytes
    pub fn total_output_size(&self) -> u64 {
        self.output_sizes.iter().map(|(_, size)| size).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Format output size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` wins over the level derived from the verbosity flags.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ssim_processor={}", log_level)));

    let initialized = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    initialized
        .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (defaults, file, environment)
///
/// CLI overrides are applied by the caller, then the result is validated again.
pub fn load_configuration(config_file: Option<&Path>) -> Result<Config> {
    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => debug!("No config file given, trying the default location"),
    }
    Config::load_layered(config_file)
}

/// Expand the command-line inputs into a sorted list of schedule files
///
/// Files are taken as given. Directories are walked recursively and only
/// files whose name matches one of `patterns` are kept.
pub fn discover_input_files(inputs: &[PathBuf], patterns: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = patterns
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|e| {
                Error::configuration(format!("Invalid file pattern '{}': {}", pattern, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(false) {
                let entry = entry?;
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if patterns.iter().any(|pattern| pattern.matches(&name)) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            return Err(Error::file_not_found(input.display().to_string()));
        }
    }

    files.sort();
    files.dedup();

    debug!("Discovered {} input files", files.len());
    for file in &files {
        debug!("  Found: {}", file.display());
    }
    Ok(files)
}

/// Output file for an input: `<stem>_flights.<ext>` in `output_dir`, or
/// next to the input when no directory is given
pub fn output_path_for(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schedule".to_string());
    let file_name = format!("{}{}.{}", stem, OUTPUT_SUFFIX, format.extension());

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input
            .parent()
            .map(|parent| parent.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name)),
    }
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Create a spinner for single-file work
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
