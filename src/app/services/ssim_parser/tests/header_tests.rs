//! Tests for header and footer extraction

use super::*;
use crate::app::models::records::FieldMap;
use crate::app::models::{SourceFormat, TimeReference};
use crate::app::services::grammar::{GrammarRegistry, RecordShape};
use crate::app::services::ssim_parser::header::{
    is_sir_footer_line, sim_header, sim_trailer, sir_footer, sir_header,
};

#[test]
fn test_sir_header_fields() {
    let registry = GrammarRegistry::new().unwrap();
    let (fields, _) = registry
        .require(RecordShape::SirHeader)
        .unwrap()
        .captures(&create_test_sir())
        .unwrap();

    let header = sir_header(&fields).unwrap();
    assert_eq!(header.format, Some(SourceFormat::Sir));
    assert_eq!(header.file_type.as_deref(), Some("SCR"));
    assert_eq!(header.creator_reference.as_deref(), Some("AB1234"));
    assert_eq!(header.season.map(|s| s.to_string()).as_deref(), Some("W17"));
    assert_eq!(header.message_date.as_deref(), Some("18OCT"));
    assert_eq!(header.airport.as_deref(), Some("LHR"));
    assert!(header.message_reference.is_none());
}

#[test]
fn test_sir_header_rejects_bad_season() {
    let mut fields = FieldMap::new();
    fields.insert("season", "X17");
    assert!(sir_header(&fields).is_err());
}

#[test]
fn test_sim_header_fields() {
    let registry = GrammarRegistry::new().unwrap();
    let records: Vec<String> = create_test_sim().lines().map(str::to_string).collect();
    let record_1 = registry
        .require(RecordShape::SimHeader)
        .unwrap()
        .match_line(&records[0])
        .unwrap();
    let record_2 = registry
        .require(RecordShape::SimCarrier)
        .unwrap()
        .match_line(&records[2])
        .unwrap();

    let header = sim_header(&record_1, Some(&record_2));
    assert_eq!(header.format, Some(SourceFormat::Sim));
    assert_eq!(header.file_type.as_deref(), Some(crate::constants::SIM_TITLE));
    assert_eq!(header.airline_designator.as_deref(), Some("KL"));
    assert_eq!(header.time_mode, Some(TimeReference::Local));
    assert_eq!(header.season.map(|s| s.to_string()).as_deref(), Some("W17"));
    assert_eq!(header.validity_from.as_deref(), Some("29OCT17"));
    assert_eq!(header.validity_to.as_deref(), Some("24MAR18"));
    assert_eq!(header.message_date.as_deref(), Some("18OCT17"));
    assert_eq!(header.creator_reference.as_deref(), Some("SCHEDULING"));
}

#[test]
fn test_sim_header_without_carrier_record() {
    let mut record_1 = FieldMap::new();
    record_1.insert("title_of_contents", crate::constants::SIM_TITLE);
    let header = sim_header(&record_1, None);
    assert!(header.season.is_none());
    assert!(header.time_mode.is_none());
}

#[test]
fn test_footer_line_prefixes() {
    assert!(is_sir_footer_line("SI TEST"));
    assert!(is_sir_footer_line("GI"));
    assert!(!is_sir_footer_line("SIR"));
    assert!(!is_sir_footer_line("NBA123 BA124"));
}

#[test]
fn test_sir_footer_items() {
    let footer = sir_footer("SI TEST MESSAGE\nGI BRGDS\n   SLOT DESK\n").unwrap();
    assert_eq!(footer.items.len(), 2);
    assert_eq!(footer.items[0].tag, "SI");
    assert_eq!(footer.items[0].text, "TEST MESSAGE");
    assert_eq!(footer.items[1].tag, "GI");
    assert_eq!(footer.items[1].text, "BRGDS SLOT DESK");
    assert!(sir_footer("  \n").is_none());
}

#[test]
fn test_sim_trailer() {
    let registry = GrammarRegistry::new().unwrap();
    let record = create_test_sim().lines().last().unwrap().to_string();
    let fields = registry
        .require(RecordShape::SimTrailer)
        .unwrap()
        .match_line(&record)
        .unwrap();
    let footer = sim_trailer(&fields, &record);
    assert_eq!(footer.serial_check_reference.as_deref(), Some("000004"));
    assert!(footer.text.starts_with("5 KL"));
}
