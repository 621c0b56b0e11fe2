//! Tests for parsing statistics

use crate::app::models::{Diagnostic, DiagnosticKind};
use crate::app::services::ssim_parser::ParseStats;

#[test]
fn test_new_stats_are_empty() {
    let stats = ParseStats::new();
    assert_eq!(stats.total_lines, 0);
    assert_eq!(stats.success_rate(), 0.0);
    assert!(!stats.is_successful());
    assert!(stats.diagnostics.is_empty());
}

#[test]
fn test_success_rate() {
    let stats = ParseStats {
        total_lines: 20,
        records_parsed: 19,
        unparsed_lines: 1,
        ..Default::default()
    };
    assert_eq!(stats.success_rate(), 95.0);
    assert!(stats.is_successful());

    let stats = ParseStats {
        total_lines: 10,
        records_parsed: 9,
        ..Default::default()
    };
    assert!(!stats.is_successful());
}

#[test]
fn test_unparsed_lines_are_recorded() {
    let mut stats = ParseStats::new();
    stats.record_unparsed(3, "XXXX");
    stats.record_unparsed(7, "YYYY");

    assert_eq!(stats.unparsed_lines, 2);
    assert_eq!(stats.unparsed_raw(), vec!["XXXX", "YYYY"]);
    assert_eq!(stats.diagnostics[1].line, Some(7));
    assert_eq!(stats.count(DiagnosticKind::UnparsedLine), 2);
}

#[test]
fn test_dropped_records_are_counted() {
    let mut stats = ParseStats::new();
    stats.record_dropped(Diagnostic::new(DiagnosticKind::MalformedDateToken, "bad date").at_line(4));
    stats.push(Diagnostic::new(DiagnosticKind::BadMidnight, "2400"));

    assert_eq!(stats.records_dropped, 1);
    assert_eq!(stats.diagnostics.len(), 2);
    assert_eq!(stats.count(DiagnosticKind::MalformedDateToken), 1);
    assert!(stats.unparsed_raw().is_empty());
}
