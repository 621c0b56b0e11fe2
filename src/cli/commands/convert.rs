//! Convert command implementation
//!
//! Reads every input schedule, expands its slots into flights and writes one
//! flight file per input. Files run concurrently on the blocking pool and a
//! failing file never stops the others.

use super::shared::{
    ConversionStats, create_progress_bar, discover_input_files, load_configuration,
    output_path_for, setup_logging,
};
use crate::app::models::{Season, SourceFormat};
use crate::app::services::expander::expand_slots;
use crate::app::services::flight_writer::FlightWriter;
use crate::app::services::grammar::GrammarRegistry;
use crate::app::services::ssim_parser::SsimReader;
use crate::cli::args::{ConvertArgs, ReportFormat};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{HumanDuration, ProgressBar};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of converting one schedule file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: SourceFormat,
    pub slots: usize,
    pub flights: usize,
    pub diagnostics: usize,
    pub output_size: u64,
}

/// Run the convert command
pub async fn run_convert(args: ConvertArgs) -> Result<ConversionStats> {
    let start_time = Instant::now();

    args.validate()?;
    setup_logging(args.get_log_level(), args.quiet)?;

    let mut config = load_configuration(args.config_file.as_deref())?;
    apply_cli_overrides(&mut config, &args)?;
    config.validate()?;

    let files = discover_input_files(&args.inputs, &config.processing.file_patterns)?;
    if files.is_empty() {
        warn!("No schedule files found in the given inputs");
        return Ok(ConversionStats::default());
    }
    info!(
        "Converting {} files with {} workers",
        files.len(),
        config.processing.workers
    );

    if let Some(output_dir) = &args.output_dir {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            Error::io(
                format!("Failed to create output directory {}", output_dir.display()),
                e,
            )
        })?;
    }

    let reader = Arc::new(SsimReader::new(
        GrammarRegistry::shared()?,
        config.reader.clone(),
    ));
    let writer = Arc::new(FlightWriter::new(config.output.clone()));

    let pb = if args.show_progress() {
        create_progress_bar(files.len() as u64, "Converting schedules")
    } else {
        ProgressBar::hidden()
    };

    let mut stats = convert_files(
        files,
        reader,
        writer,
        ConvertSettings {
            output_dir: args.output_dir.clone(),
            season: args.season,
            force_overwrite: config.processing.force_overwrite,
            workers: config.processing.workers,
        },
        &pb,
    )
    .await;
    pb.finish_with_message("Conversion complete");

    stats.processing_time = start_time.elapsed();

    match args.report {
        ReportFormat::Human if !args.quiet => generate_human_report(&stats),
        ReportFormat::Human => {}
        ReportFormat::Json => generate_json_report(&stats)?,
    }

    Ok(stats)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &ConvertArgs) -> Result<()> {
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(airport) = &args.airport {
        config.reader.airport_code = Some(airport.to_ascii_uppercase());
    }
    if let Some(encoding) = args.encoding {
        config.reader.encoding = encoding;
    }
    if let Some(prefix) = &args.year_prefix {
        config.reader.year_prefix = prefix.clone();
    }
    if let Some(workers) = args.workers {
        config.processing.workers = workers;
    }
    if args.no_raw {
        config.output.include_raw = false;
    }
    if args.force_overwrite {
        config.processing.force_overwrite = true;
    }
    Ok(())
}

/// Per-run settings shared by every file task
#[derive(Debug, Clone)]
pub struct ConvertSettings {
    pub output_dir: Option<PathBuf>,
    pub season: Option<Season>,
    pub force_overwrite: bool,
    pub workers: usize,
}

/// Convert files concurrently, bounded by the worker count
pub async fn convert_files(
    files: Vec<PathBuf>,
    reader: Arc<SsimReader>,
    writer: Arc<FlightWriter>,
    settings: ConvertSettings,
    pb: &ProgressBar,
) -> ConversionStats {
    let format = writer.config().format;
    let workers = settings.workers.max(1);

    let mut results = stream::iter(files)
        .map(|input| {
            let reader = Arc::clone(&reader);
            let writer = Arc::clone(&writer);
            let output = output_path_for(&input, settings.output_dir.as_deref(), format);
            let season = settings.season;
            let force = settings.force_overwrite;
            let pb = pb.clone();
            async move {
                if let Some(file_name) = input.file_name() {
                    pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                }
                let task_input = input.clone();
                let result = tokio::task::spawn_blocking(move || {
                    convert_file(&reader, &writer, &task_input, &output, season, force)
                })
                .await
                .map_err(|e| Error::processing_interrupted(format!("Worker task failed: {}", e)))
                .and_then(|result| result);
                (input, result)
            }
        })
        .buffer_unordered(workers);

    let mut stats = ConversionStats::default();
    while let Some((input, result)) = results.next().await {
        pb.inc(1);
        match result {
            Ok(outcome) => {
                debug!(
                    "{} ({}): {} slots, {} flights",
                    input.display(),
                    outcome.format,
                    outcome.slots,
                    outcome.flights
                );
                stats.files_processed += 1;
                stats.slots_read += outcome.slots;
                stats.flights_written += outcome.flights;
                stats.diagnostics += outcome.diagnostics;
                stats.output_sizes.push((
                    outcome.output.display().to_string(),
                    outcome.output_size,
                ));
            }
            Err(e) => {
                error!("Failed to convert {}: {:#}", input.display(), e);
                stats.files_failed += 1;
                stats
                    .failures
                    .push((input.display().to_string(), e.to_string()));
            }
        }
    }

    stats.output_sizes.sort();
    stats.failures.sort();
    stats
}

/// Read, expand and write a single schedule file
///
/// An explicit `season` wins over the season named in the file header.
pub fn convert_file(
    reader: &SsimReader,
    writer: &FlightWriter,
    input: &Path,
    output: &Path,
    season: Option<Season>,
    force_overwrite: bool,
) -> Result<FileOutcome> {
    if output.exists() && !force_overwrite {
        return Err(Error::configuration(format!(
            "Output file {} already exists (use --force to overwrite)",
            output.display()
        )));
    }

    let slot_file = reader.read(input, None, None)?;
    let season = season.or(slot_file.header.season);
    let expansion = expand_slots(
        &slot_file.slots,
        season.as_ref(),
        &reader.config().year_prefix,
    )?;
    expansion.stats.log_summary();

    let flights = writer.write(&expansion.flights, output)?;
    let output_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);

    Ok(FileOutcome {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        format: slot_file.format,
        slots: slot_file.slots.len(),
        flights,
        diagnostics: slot_file.stats.diagnostics.len() + expansion.stats.diagnostics.len(),
        output_size,
    })
}

/// Generate human-readable report
fn generate_human_report(stats: &ConversionStats) {
    let duration = HumanDuration(stats.processing_time);
    let total_size = ConversionStats::format_size(stats.total_output_size());

    println!("\n{}", "SSIM Conversion Complete".bright_green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📊 Conversion Summary:");
    println!(
        "   • Files converted: {}",
        stats.files_processed.to_string().bright_white().bold()
    );
    println!("   • Slots read: {}", stats.slots_read);
    println!(
        "   • Flights written: {}",
        stats.flights_written.to_string().bright_white().bold()
    );
    println!("   • Diagnostics: {}", stats.diagnostics);
    println!("   • Total output size: {}", total_size);
    println!("   • Processing time: {}", duration);

    if stats.has_failures() {
        println!(
            "⚠️  Files failed: {}",
            stats.files_failed.to_string().bright_red().bold()
        );
        for (file, reason) in &stats.failures {
            println!("   • {}: {}", file, reason);
        }
    }

    if !stats.output_sizes.is_empty() {
        println!("\n📁 Output Files:");
        for (filename, size) in &stats.output_sizes {
            println!("   • {}: {}", filename, ConversionStats::format_size(*size));
        }
    }

    println!();
}

/// Generate JSON report for machine consumption
fn generate_json_report(stats: &ConversionStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(|e| {
        Error::output_writing("Failed to serialize conversion report", Box::new(e))
    })?;
    println!("{}", json);
    Ok(())
}
