//! Rows of the semicolon-separated schedule export
//!
//! Columns are positional:
//! action code, airport, airline, flight number, suffix, direction, time,
//! first date, last date, weekdays, stations, aircraft type, service type,
//! frequency, two fillers, season, remarks, seats and the source line.

use super::field_parsers::non_blank;
use super::stats::ParseStats;
use crate::app::models::records::{CsvRecord, FlightDesignator, ParsedRecord, RawLine};
use crate::app::models::{Diagnostic, DiagnosticKind};
use crate::constants::{CSV_COLUMN_COUNT, CSV_DELIMITER, CSV_HEADER_MARKER};
use csv::StringRecord;
use tracing::debug;

fn build_record(row: &StringRecord, raw: RawLine) -> CsvRecord {
    let cell = |index: usize| non_blank(row.get(index));
    CsvRecord {
        action_code: cell(0),
        airport: cell(1),
        designator: FlightDesignator {
            airline_designator: cell(2),
            flight_number: cell(3),
            operational_suffix: cell(4),
        },
        direction: cell(5),
        scheduled_time: cell(6),
        period_from: cell(7),
        period_to: cell(8),
        days_of_operation: cell(9),
        stations: cell(10),
        aircraft_type: cell(11),
        service_type: cell(12),
        frequency_rate: cell(13),
        season: cell(16),
        remarks: cell(17),
        seats: cell(18),
        source_raw: cell(19),
        raw,
    }
}

/// Parse every row of the export
///
/// A header row is skipped. Rows with the wrong number of columns are kept
/// as unparsed lines.
pub fn parse_csv_records(text: &str, stats: &mut ParseStats) -> Vec<ParsedRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let delimiter = char::from(CSV_DELIMITER).to_string();
    let mut records = Vec::new();

    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(row) => {
                let line = row
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(index + 1);

                if index == 0 && row.get(0).map(str::trim) == Some(CSV_HEADER_MARKER) {
                    debug!("Skipping CSV header row");
                    continue;
                }

                stats.total_lines += 1;
                let raw = RawLine::new(line, row.iter().collect::<Vec<_>>().join(&delimiter));

                if row.len() != CSV_COLUMN_COUNT {
                    stats.record_unparsed(line, &raw.text);
                    records.push(ParsedRecord::Unparsed(raw));
                    continue;
                }

                stats.records_parsed += 1;
                records.push(ParsedRecord::Csv(build_record(&row, raw)));
            }
            Err(e) => {
                stats.total_lines += 1;
                stats.unparsed_lines += 1;
                let line = e.position().map(|p| p.line() as usize).unwrap_or(index + 1);
                stats.push(
                    Diagnostic::new(DiagnosticKind::UnparsedLine, format!("CSV error: {}", e))
                        .at_line(line),
                );
            }
        }
    }

    records
}
