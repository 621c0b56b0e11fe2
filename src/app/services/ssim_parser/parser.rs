//! Schedule reader implementation
//!
//! Handles file reading and decoding, sub-format detection, splitting each
//! format into header, body and footer, and hands the body records to the
//! uniformizer.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::csv_reader::parse_csv_records;
use super::detector::detect_format;
use super::field_parsers::{normalize_text, split_fixed_records};
use super::header::{is_sir_footer_line, sim_header, sim_trailer, sir_footer, sir_header};
use super::record_parser::{parse_body_lines, sir_body_lines};
use super::stats::{ParseStats, ParsedMessage, SlotFile};
use crate::app::models::records::{FieldMap, RawLine};
use crate::app::models::{Footer, Header, SourceFormat};
use crate::app::services::grammar::{GrammarRegistry, RecordShape};
use crate::app::services::uniformizer::{UniformizeContext, uniformize};
use crate::config::{ReaderConfig, TextEncoding};
use crate::{Error, Result};

/// Reader for SIR messages, SIM data sets and the CSV export
///
/// The compiled grammar set is shared, so cloning a reader or handing it to
/// worker threads does not recompile any pattern.
#[derive(Debug, Clone)]
pub struct SsimReader {
    registry: Arc<GrammarRegistry>,
    config: ReaderConfig,
}

impl SsimReader {
    pub fn new(registry: Arc<GrammarRegistry>, config: ReaderConfig) -> Self {
        Self { registry, config }
    }

    /// Reader with a freshly compiled grammar set and default settings
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(GrammarRegistry::shared()?, ReaderConfig::default()))
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read a schedule file into canonical slots
    ///
    /// `airport_code` and `encoding` override the reader configuration when
    /// given. Per-record failures end up as diagnostics in the returned
    /// statistics; only an unreadable or unrecognisable file is an error.
    pub fn read(
        &self,
        path: &Path,
        airport_code: Option<&str>,
        encoding: Option<&str>,
    ) -> Result<SlotFile> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }
        info!("Reading schedule file: {}", path.display());

        let encoding = match encoding {
            Some(name) => name.parse::<TextEncoding>()?,
            None => self.config.encoding,
        };
        let bytes = std::fs::read(path)
            .map_err(|e| Error::io(format!("Failed to read file {}", path.display()), e))?;
        let text = encoding.decode(&bytes)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.read_text(&text, &file_name, airport_code)
    }

    /// Read already decoded message text into canonical slots
    pub fn read_text(
        &self,
        text: &str,
        source_name: &str,
        airport_code: Option<&str>,
    ) -> Result<SlotFile> {
        let ParsedMessage {
            format,
            header,
            footer,
            records,
            mut stats,
        } = self.parse_message(text, source_name)?;

        let airport_code = airport_code.or(self.config.airport_code.as_deref());
        let context = UniformizeContext {
            format,
            header: &header,
            airport_code,
            year_prefix: &self.config.year_prefix,
        };
        let slots = uniformize(records, &context, &mut stats);
        stats.log_summary(source_name);

        Ok(SlotFile {
            format,
            header,
            footer,
            slots,
            stats,
        })
    }

    /// Detect the format and split a message into header, records and footer
    pub fn parse_message(&self, text: &str, source_name: &str) -> Result<ParsedMessage> {
        let text = normalize_text(text);
        let format = detect_format(&text, &self.registry)
            .ok_or_else(|| Error::unrecognized_format(source_name))?;
        debug!("{} detected as {}", source_name, format);

        match format {
            SourceFormat::Sir => self.parse_sir(&text),
            SourceFormat::Sim => self.parse_sim(&text),
            SourceFormat::Csv => Ok(parse_csv(&text)),
        }
    }

    fn parse_sir(&self, text: &str) -> Result<ParsedMessage> {
        let header_pattern = self.registry.require(RecordShape::SirHeader)?;
        let (fields, end) = header_pattern
            .captures(text)
            .ok_or_else(|| Error::unrecognized_format("SIR header"))?;
        let header = sir_header(&fields)?;

        let header_lines = text[..end].matches('\n').count();
        let (body, footer_text) = split_sir_footer(&text[end..]);
        let lines = sir_body_lines(body, header_lines + 1);

        let mut stats = ParseStats::new();
        let patterns = self.registry.line_patterns(SourceFormat::Sir);
        let records = parse_body_lines(lines, &patterns, &mut stats);

        Ok(ParsedMessage {
            format: SourceFormat::Sir,
            header,
            footer: footer_text.and_then(sir_footer),
            records,
            stats,
        })
    }

    /// Record types 1 and 2 form the header, 3 and 4 the body and the last
    /// type 5 record the footer. Zero-filled padding records are skipped.
    fn parse_sim(&self, text: &str) -> Result<ParsedMessage> {
        let header_pattern = self.registry.require(RecordShape::SimHeader)?;
        let carrier_pattern = self.registry.require(RecordShape::SimCarrier)?;
        let trailer_pattern = self.registry.require(RecordShape::SimTrailer)?;

        let mut stats = ParseStats::new();
        let mut record_1: Option<FieldMap> = None;
        let mut record_2: Option<FieldMap> = None;
        let mut footer: Option<Footer> = None;
        let mut body: Vec<RawLine> = Vec::new();

        for record in split_fixed_records(text, self.registry.sim_record_width()) {
            match record.text.chars().next() {
                Some('1') if record_1.is_none() => record_1 = header_pattern.match_line(&record.text),
                Some('2') if record_2.is_none() => {
                    record_2 = carrier_pattern.match_line(&record.text)
                }
                Some('1' | '2') => debug!("Skipping repeated header record on line {}", record.number),
                Some('3' | '4') => body.push(record),
                Some('5') => {
                    if let Some(fields) = trailer_pattern.match_line(&record.text) {
                        footer = Some(sim_trailer(&fields, &record.text));
                    }
                }
                Some('0') => {}
                _ => {
                    stats.total_lines += 1;
                    stats.record_unparsed(record.number, record.text.trim_end());
                }
            }
        }

        let header = match &record_1 {
            Some(first) => sim_header(first, record_2.as_ref()),
            None => Header {
                format: Some(SourceFormat::Sim),
                ..Default::default()
            },
        };

        let patterns = self.registry.line_patterns(SourceFormat::Sim);
        let records = parse_body_lines(body, &patterns, &mut stats);

        Ok(ParsedMessage {
            format: SourceFormat::Sim,
            header,
            footer,
            records,
            stats,
        })
    }
}

fn parse_csv(text: &str) -> ParsedMessage {
    let mut stats = ParseStats::new();
    let records = parse_csv_records(text, &mut stats);
    ParsedMessage {
        format: SourceFormat::Csv,
        header: Header {
            format: Some(SourceFormat::Csv),
            file_type: Some("CSV".to_string()),
            ..Default::default()
        },
        footer: None,
        records,
        stats,
    }
}

/// Split SIR body text at the first `SI`/`GI` line
fn split_sir_footer(body: &str) -> (&str, Option<&str>) {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if is_sir_footer_line(line.trim_end_matches('\n')) {
            return (&body[..offset], Some(&body[offset..]));
        }
        offset += line.len();
    }
    (body, None)
}
