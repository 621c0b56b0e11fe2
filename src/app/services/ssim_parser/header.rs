//! Header and footer extraction
//!
//! Turns the captured header fields of SIR and SIM messages into the
//! format-neutral [`Header`], and the trailing SIR free text or SIM
//! trailer record into a [`Footer`].

use crate::Result;
use crate::app::models::records::FieldMap;
use crate::app::models::{Footer, FooterItem, Header, Season, SourceFormat, TimeReference};
use crate::constants::SIR_FOOTER_PREFIXES;
use tracing::warn;

/// Header of a SIR message
pub fn sir_header(fields: &FieldMap) -> Result<Header> {
    let season = fields.get("season").map(str::parse::<Season>).transpose()?;
    let message_date = match (fields.get("day_of_message"), fields.get("month_of_message")) {
        (Some(day), Some(month)) => Some(format!("{}{}", day, month)),
        _ => None,
    };

    Ok(Header {
        format: Some(SourceFormat::Sir),
        file_type: fields.get("file_type").map(str::to_string),
        season,
        creator_reference: fields.get("creator_reference").map(str::to_string),
        message_date,
        airport: fields.get("clearance_advice_airport").map(str::to_string),
        message_reference: fields.get("message_reference").map(str::to_string),
        ..Default::default()
    })
}

/// Header of a SIM data set from record types 1 and 2
///
/// An unreadable season code in the carrier record is logged and left out;
/// legs carry absolute dates and only need the season for sentinels.
pub fn sim_header(record_1: &FieldMap, record_2: Option<&FieldMap>) -> Header {
    let mut header = Header {
        format: Some(SourceFormat::Sim),
        file_type: record_1.get("title_of_contents").map(str::to_string),
        ..Default::default()
    };

    if let Some(carrier) = record_2 {
        header.season = carrier.get("season").and_then(|code| {
            code.parse::<Season>()
                .map_err(|e| warn!("Ignoring SIM season '{}': {}", code, e))
                .ok()
        });
        header.airline_designator = carrier.get("airline_designator").map(str::to_string);
        header.time_mode = match carrier.get("time_mode") {
            Some("U") => Some(TimeReference::Utc),
            Some("L") => Some(TimeReference::Local),
            _ => None,
        };
        header.creator_reference = carrier.get("creator_reference").map(str::to_string);
        header.message_date = carrier.get("creation_date").map(str::to_string);
        header.validity_from = carrier
            .get("period_of_schedule_validity_from")
            .map(str::to_string);
        header.validity_to = carrier
            .get("period_of_schedule_validity_to")
            .map(str::to_string);
    }

    header
}

/// Whether a line opens a SIR footer item
pub fn is_sir_footer_line(line: &str) -> bool {
    SIR_FOOTER_PREFIXES.iter().any(|prefix| {
        line.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

/// Footer of a SIR message; continuation lines join the preceding item
pub fn sir_footer(text: &str) -> Option<Footer> {
    let text = text.trim_end();
    if text.trim().is_empty() {
        return None;
    }

    let mut items: Vec<FooterItem> = Vec::new();
    for line in text.lines() {
        if is_sir_footer_line(line) {
            let (tag, rest) = line.split_at(2);
            items.push(FooterItem {
                tag: tag.to_string(),
                text: rest.trim().to_string(),
            });
        } else if let Some(last) = items.last_mut() {
            let continuation = line.trim();
            if !continuation.is_empty() {
                if !last.text.is_empty() {
                    last.text.push(' ');
                }
                last.text.push_str(continuation);
            }
        }
    }

    Some(Footer {
        text: text.to_string(),
        items,
        serial_check_reference: None,
    })
}

/// Footer of a SIM data set from record type 5
pub fn sim_trailer(fields: &FieldMap, raw: &str) -> Footer {
    Footer {
        text: raw.trim_end().to_string(),
        items: Vec::new(),
        serial_check_reference: fields
            .get("serial_number_check_reference")
            .map(str::to_string),
    }
}
