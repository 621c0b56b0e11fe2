//! Sub-format detection

use super::field_parsers::pad_record;
use crate::app::models::SourceFormat;
use crate::app::services::grammar::{GrammarRegistry, RecordShape};
use crate::constants::{CSV_COLUMN_COUNT, CSV_DELIMITER, SIM_RECORD_WIDTH, SIM_TITLE};
use tracing::debug;

/// Detect the sub-format of normalised message text
///
/// The SIR header grammar is tried first, then SIM record type 1 with its
/// literal title, then the column count of the first CSV row.
pub fn detect_format(text: &str, registry: &GrammarRegistry) -> Option<SourceFormat> {
    if registry
        .get(RecordShape::SirHeader)
        .is_some_and(|p| p.captures(text).is_some())
    {
        debug!("Detected SIR message");
        return Some(SourceFormat::Sir);
    }

    let first_line = text.lines().next().unwrap_or("");
    let first_record: String = first_line.chars().take(SIM_RECORD_WIDTH).collect();
    let is_sim = registry
        .get(RecordShape::SimHeader)
        .and_then(|p| p.match_line(&pad_record(&first_record, SIM_RECORD_WIDTH)))
        .is_some_and(|fields| fields.get("title_of_contents") == Some(SIM_TITLE));
    if is_sim {
        debug!("Detected SIM data set");
        return Some(SourceFormat::Sim);
    }

    let delimiter = char::from(CSV_DELIMITER);
    let first_row = text.lines().find(|line| !line.trim().is_empty())?;
    if first_row.split(delimiter).count() == CSV_COLUMN_COUNT {
        debug!("Detected CSV export");
        return Some(SourceFormat::Csv);
    }

    None
}
