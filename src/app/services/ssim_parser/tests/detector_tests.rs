//! Tests for sub-format detection

use super::*;
use crate::app::models::SourceFormat;
use crate::app::services::grammar::GrammarRegistry;
use crate::app::services::ssim_parser::detect_format;
use crate::app::services::ssim_parser::field_parsers::normalize_text;

fn detect(text: &str) -> Option<SourceFormat> {
    let registry = GrammarRegistry::new().unwrap();
    detect_format(&normalize_text(text), &registry)
}

#[test]
fn test_detects_sir() {
    assert_eq!(detect(&create_test_sir()), Some(SourceFormat::Sir));
}

#[test]
fn test_detects_sir_with_crlf_and_bom() {
    let text = format!("\u{feff}{}", create_test_sir().replace('\n', "\r\n"));
    assert_eq!(detect(&text), Some(SourceFormat::Sir));
}

#[test]
fn test_detects_sim() {
    assert_eq!(detect(&create_test_sim()), Some(SourceFormat::Sim));
}

#[test]
fn test_detects_undelimited_sim() {
    let text = create_test_sim().replace('\n', "");
    assert_eq!(detect(&text), Some(SourceFormat::Sim));
}

#[test]
fn test_detects_csv() {
    assert_eq!(detect(&create_test_csv()), Some(SourceFormat::Csv));
}

#[test]
fn test_sim_title_must_match() {
    let text = sim_record(
        '1',
        crate::app::services::grammar::SIM_HEADER_LAYOUT,
        &[("title_of_contents", "SOME OTHER DATA SET")],
    );
    assert_eq!(detect(&text), None);
}

#[test]
fn test_unrecognized_text() {
    assert_eq!(detect("hello world\nnot a schedule"), None);
    assert_eq!(detect(""), None);
    assert_eq!(detect("a;b;c"), None);
}
