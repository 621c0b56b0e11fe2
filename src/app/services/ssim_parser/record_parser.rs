//! Body line matching
//!
//! Each logical line is offered to every body grammar of its format in
//! ascending priority. The last grammar that matches decides the record
//! shape; a line nothing matches is kept as [`ParsedRecord::Unparsed`].

use super::stats::ParseStats;
use crate::app::models::records::{
    ArrivalRecord, CombinedRecord, DepartureRecord, FieldMap, FlightLegRecord, ParsedRecord,
    RawLine, SegmentDataRecord,
};
use crate::app::services::grammar::{GrammarPattern, RecordShape};

/// Build the record of a matched shape
fn build_record(shape: RecordShape, fields: FieldMap, raw: RawLine) -> ParsedRecord {
    match shape {
        RecordShape::Combined => ParsedRecord::Combined(CombinedRecord::from_fields(fields, raw)),
        RecordShape::ArrivalOnly => ParsedRecord::ArrivalOnly(ArrivalRecord::from_fields(fields, raw)),
        RecordShape::DepartureOnly => {
            ParsedRecord::DepartureOnly(DepartureRecord::from_fields(fields, raw))
        }
        RecordShape::FlightLeg => ParsedRecord::FlightLeg(FlightLegRecord::from_fields(fields, raw)),
        RecordShape::SegmentData => {
            ParsedRecord::SegmentData(SegmentDataRecord::from_fields(fields, raw))
        }
        RecordShape::SirHeader
        | RecordShape::SimHeader
        | RecordShape::SimCarrier
        | RecordShape::SimTrailer => ParsedRecord::Unparsed(raw),
    }
}

/// Match one logical line
pub fn parse_line(line: RawLine, patterns: &[&GrammarPattern]) -> ParsedRecord {
    let mut matched: Option<(RecordShape, FieldMap)> = None;
    for pattern in patterns {
        if let Some(fields) = pattern.match_line(&line.text) {
            matched = Some((pattern.shape, fields));
        }
    }

    match matched {
        Some((shape, fields)) => build_record(shape, fields, line),
        None => ParsedRecord::Unparsed(line),
    }
}

/// Match every body line, counting results in `stats`
pub fn parse_body_lines(
    lines: Vec<RawLine>,
    patterns: &[&GrammarPattern],
    stats: &mut ParseStats,
) -> Vec<ParsedRecord> {
    let mut records = Vec::with_capacity(lines.len());

    for line in lines {
        stats.total_lines += 1;
        let record = parse_line(line, patterns);
        match &record {
            ParsedRecord::Unparsed(raw) => stats.record_unparsed(raw.number, &raw.text),
            _ => stats.records_parsed += 1,
        }
        records.push(record);
    }

    records
}

/// Join `/ remark /` continuation lines onto the record line before them
///
/// The joined line keeps the number of the record line.
pub fn join_remark_lines(lines: Vec<RawLine>) -> Vec<RawLine> {
    let mut joined: Vec<RawLine> = Vec::with_capacity(lines.len());

    for line in lines {
        let is_remark = line.text.trim_start().starts_with('/');
        match joined.last_mut() {
            Some(previous) if is_remark => {
                previous.text.push(' ');
                previous.text.push_str(line.text.trim());
            }
            _ => joined.push(line),
        }
    }

    joined
}

/// Logical body lines of SIR text, blank lines dropped
pub fn sir_body_lines(body: &str, first_line_number: usize) -> Vec<RawLine> {
    let lines = body
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| RawLine::new(first_line_number + index, text.trim_end()))
        .collect();
    join_remark_lines(lines)
}
