//! Inspect command implementation
//!
//! Reports what the reader made of one schedule file: the detected format,
//! header and footer, slot and flight counts, and every diagnostic.

use super::shared::{ConversionStats, load_configuration, setup_logging};
use crate::app::models::{Diagnostic, Direction, Footer, Header, Season, SourceFormat};
use crate::app::services::expander::{ExpansionStats, expand_slots};
use crate::app::services::grammar::GrammarRegistry;
use crate::app::services::ssim_parser::{ParseStats, SsimReader};
use crate::cli::args::{InspectArgs, ReportFormat};
use crate::{Error, Result};
use chrono::NaiveDate;
use colored::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Everything `inspect` reports about a file
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub file: String,
    pub format: SourceFormat,
    pub header: Header,
    pub footer: Option<Footer>,
    pub slots: usize,
    pub arrivals: usize,
    pub departures: usize,
    pub flights: usize,
    pub first_flight_date: Option<NaiveDate>,
    pub last_flight_date: Option<NaiveDate>,
    pub parse: ParseStats,
    pub expansion: ExpansionStats,
}

impl InspectionReport {
    /// Parse and expansion diagnostics in file order
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parse
            .diagnostics
            .iter()
            .chain(self.expansion.diagnostics.iter())
    }
}

/// Run the inspect command
pub async fn run_inspect(args: InspectArgs) -> Result<ConversionStats> {
    let start_time = Instant::now();

    args.validate()?;
    setup_logging(args.get_log_level(), false)?;

    let mut config = load_configuration(args.config_file.as_deref())?;
    if let Some(airport) = &args.airport {
        config.reader.airport_code = Some(airport.to_ascii_uppercase());
    }
    if let Some(encoding) = args.encoding {
        config.reader.encoding = encoding;
    }
    config.validate()?;

    let reader = SsimReader::new(GrammarRegistry::shared()?, config.reader.clone());
    let input = args.input.clone();
    let season = args.season;
    let report = tokio::task::spawn_blocking(move || inspect_file(&reader, &input, season))
        .await
        .map_err(|e| Error::processing_interrupted(format!("Worker task failed: {}", e)))??;

    match args.format {
        ReportFormat::Human => print_human_report(&report, args.limit),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(|e| {
                Error::output_writing("Failed to serialize inspection report", Box::new(e))
            })?;
            println!("{}", json);
        }
    }

    Ok(ConversionStats {
        files_processed: 1,
        slots_read: report.slots,
        diagnostics: report.diagnostics().count(),
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

/// Read and expand a file without writing anything
pub fn inspect_file(
    reader: &SsimReader,
    input: &Path,
    season: Option<Season>,
) -> Result<InspectionReport> {
    let slot_file = reader.read(input, None, None)?;
    let season = season.or(slot_file.header.season);
    let expansion = expand_slots(
        &slot_file.slots,
        season.as_ref(),
        &reader.config().year_prefix,
    )?;

    let count = |direction: Direction| {
        slot_file
            .slots
            .iter()
            .filter(|slot| slot.direction == direction)
            .count()
    };
    let dates = expansion.flights.iter().map(|flight| flight.operating_date());

    Ok(InspectionReport {
        file: input.display().to_string(),
        format: slot_file.format,
        arrivals: count(Direction::Arrival),
        departures: count(Direction::Departure),
        slots: slot_file.slots.len(),
        flights: expansion.flights.len(),
        first_flight_date: dates.clone().min(),
        last_flight_date: dates.max(),
        header: slot_file.header,
        footer: slot_file.footer,
        parse: slot_file.stats,
        expansion: expansion.stats,
    })
}

fn print_field(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("   • {}: {}", label, value);
    }
}

fn print_human_report(report: &InspectionReport, limit: usize) {
    println!("\n{}", report.file.bright_green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📄 Format: {}", report.format.to_string().bright_white().bold());

    let header = &report.header;
    println!("\n📋 Header:");
    let season = header.season.map(|s| s.to_string());
    print_field("File type", header.file_type.as_deref());
    print_field("Season", season.as_deref());
    print_field("Airport", header.airport.as_deref());
    print_field("Airline", header.airline_designator.as_deref());
    print_field("Creator reference", header.creator_reference.as_deref());
    print_field("Message date", header.message_date.as_deref());
    print_field("Message reference", header.message_reference.as_deref());
    print_field("Valid from", header.validity_from.as_deref());
    print_field("Valid to", header.validity_to.as_deref());

    if let Some(footer) = &report.footer {
        println!("\n📝 Footer:");
        for item in &footer.items {
            println!("   • {}: {}", item.tag, item.text);
        }
        print_field("Serial check reference", footer.serial_check_reference.as_deref());
    }

    println!("\n📊 Contents:");
    println!(
        "   • Lines: {} ({} parsed, {} unparsed, {:.1}% success)",
        report.parse.total_lines,
        report.parse.records_parsed,
        report.parse.unparsed_lines,
        report.parse.success_rate()
    );
    println!(
        "   • Slots: {} ({} arrivals, {} departures)",
        report.slots, report.arrivals, report.departures
    );
    println!("   • Records dropped: {}", report.parse.records_dropped);
    println!(
        "   • Flights: {}",
        report.flights.to_string().bright_white().bold()
    );
    if let (Some(first), Some(last)) = (report.first_flight_date, report.last_flight_date) {
        println!("   • Operating dates: {} to {}", first, last);
    }

    let total = report.diagnostics().count();
    if total > 0 {
        println!(
            "\n⚠️  Diagnostics: {}",
            total.to_string().bright_yellow().bold()
        );
        for diagnostic in report.diagnostics().take(limit) {
            println!("   • {}", diagnostic);
        }
        if total > limit {
            println!("   … {} more", total - limit);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::DiagnosticKind;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_sir_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("lhr.sir");
        std::fs::write(
            &input,
            "SCR\n/AB1234\nW17\n18OCT\nLHR\n\
             NBA123 BA124 29OCT05NOV 0000007 180320 AMS1200 1300CDG JJ\n\
             XXXX GARBAGE\n\
             SI TEST MESSAGE\n",
        )
        .unwrap();

        let reader = SsimReader::with_defaults().unwrap();
        let report = inspect_file(&reader, &input, None).unwrap();

        assert_eq!(report.format, SourceFormat::Sir);
        assert_eq!(report.header.airport.as_deref(), Some("LHR"));
        assert_eq!(report.slots, 2);
        assert_eq!(report.arrivals, 1);
        assert_eq!(report.departures, 1);
        assert_eq!(report.flights, 4);
        assert_eq!(report.first_flight_date, NaiveDate::from_ymd_opt(2017, 10, 29));
        assert_eq!(report.last_flight_date, NaiveDate::from_ymd_opt(2017, 11, 5));
        assert!(report.footer.is_some());
        assert!(
            report
                .diagnostics()
                .any(|d| d.kind == DiagnosticKind::UnparsedLine)
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["header"]["airport"], "LHR");
        assert_eq!(json["flights"], 4);
    }

    #[test]
    fn test_inspect_unrecognized_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "hello\n").unwrap();

        let reader = SsimReader::with_defaults().unwrap();
        let result = inspect_file(&reader, &input, None);
        assert!(matches!(result, Err(Error::UnrecognizedFormat { .. })));
    }
}
