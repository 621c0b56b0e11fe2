//! Parsing statistics and result structures for schedule reading

use crate::app::models::records::ParsedRecord;
use crate::app::models::{Diagnostic, DiagnosticKind, Footer, Header, Slot, SourceFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Unparsed lines quoted in the summary warning
const UNPARSED_PREVIEW: usize = 5;

/// Header, footer and body records of a message before uniformization
#[derive(Debug, Clone)]
pub struct ParsedMessage {
    pub format: SourceFormat,
    pub header: Header,
    pub footer: Option<Footer>,
    pub records: Vec<ParsedRecord>,
    pub stats: ParseStats,
}

/// Result of reading one schedule file
#[derive(Debug, Clone, Serialize)]
pub struct SlotFile {
    pub format: SourceFormat,
    pub header: Header,
    pub footer: Option<Footer>,
    pub slots: Vec<Slot>,
    pub stats: ParseStats,
}

/// Parsing statistics with every diagnostic raised along the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Body lines presented to the record grammars
    pub total_lines: usize,

    /// Lines matched by a grammar
    pub records_parsed: usize,

    /// Lines no grammar matched
    pub unparsed_lines: usize,

    /// Canonical slots produced
    pub slots_built: usize,

    /// Parsed records excluded by a record-level failure
    pub records_dropped: usize,

    pub diagnostics: Vec<Diagnostic>,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a diagnostic and log it
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::UnparsedLine => debug!("{}", diagnostic),
            _ => warn!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Count a line no grammar matched
    pub fn record_unparsed(&mut self, line: usize, raw: &str) {
        self.unparsed_lines += 1;
        self.push(
            Diagnostic::new(DiagnosticKind::UnparsedLine, "no record grammar matched")
                .at_line(line)
                .with_raw(raw),
        );
    }

    /// Count a record dropped for a record-level failure
    pub fn record_dropped(&mut self, diagnostic: Diagnostic) {
        self.records_dropped += 1;
        self.push(diagnostic);
    }

    /// Number of diagnostics of a kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    /// Raw text of every unparsed line
    pub fn unparsed_raw(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnparsedLine)
            .filter_map(|d| d.raw.as_deref())
            .collect()
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            (self.records_parsed as f64 / self.total_lines as f64) * 100.0
        }
    }

    /// Check if parsing was mostly successful (>90% success rate)
    pub fn is_successful(&self) -> bool {
        self.success_rate() > 90.0
    }

    /// Warn once about lines that could not be parsed
    pub fn log_summary(&self, source: &str) {
        if self.unparsed_lines > 0 {
            let preview: Vec<&str> = self
                .unparsed_raw()
                .into_iter()
                .take(UNPARSED_PREVIEW)
                .collect();
            warn!(
                "{}: {} of {} lines could not be parsed: {:?}",
                source, self.unparsed_lines, self.total_lines, preview
            );
        }
        if self.records_dropped > 0 {
            warn!("{}: {} records dropped", source, self.records_dropped);
        }
    }
}
