//! Application constants for the SSIM processor
//!
//! Literal markers, column widths, designator alphabets and default
//! values shared by the grammars, resolvers and the CLI.

// =============================================================================
// Message Markers
// =============================================================================

/// File-type tags that open a SIR slot message
pub const SIR_FILE_TYPES: &[&str] = &["SAL", "SAQ", "SCR", "SHL", "SIR", "SMA", "WCR", "WIR"];

/// Literal title carried by SIM record type 1
pub const SIM_TITLE: &str = "AIRLINE STANDARD SCHEDULE DATA SET";

/// Width of every SIM record
pub const SIM_RECORD_WIDTH: usize = 200;

/// Line prefixes that start the free-text footer of a SIR message
pub const SIR_FOOTER_PREFIXES: &[&str] = &["SI", "GI"];

/// Number of semicolon-separated columns in the CSV export
pub const CSV_COLUMN_COUNT: usize = 20;

/// Column delimiter of the CSV export
pub const CSV_DELIMITER: u8 = b';';

/// First cell of an optional CSV header row
pub const CSV_HEADER_MARKER: &str = "action_code";

// =============================================================================
// Dates
// =============================================================================

/// Period bound meaning "start/end of season"
pub const SEASON_SENTINEL: &str = "00XXX00";

/// Day-month form of the season sentinel, seen in SIR periods
pub const SEASON_SENTINEL_SHORT: &str = "00XXX";

/// Century prefix prepended to two-digit years
pub const DEFAULT_YEAR_PREFIX: &str = "20";

/// Month abbreviations in calendar order
pub const MONTH_ABBREVIATIONS: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Months before this one belong to the following calendar year in a winter season
pub const WINTER_ROLLOVER_MONTH: u32 = 6;

/// Clock value some sources use for midnight
pub const BAD_MIDNIGHT: &str = "2400";

/// Replacement for [`BAD_MIDNIGHT`]
pub const MIDNIGHT: &str = "0000";

// =============================================================================
// Aircraft Configuration
// =============================================================================

/// Separator between seating layout and aircraft version
pub const CONFIGURATION_VERSION_SEPARATOR: &str = "VV";

/// Single-letter passenger class designators
pub const SEAT_CLASS_DESIGNATORS: &[char] = &[
    'F', 'A', 'P', 'J', 'C', 'D', 'I', 'Z', 'R', 'W', 'E', 'Y', 'B', 'H', 'K', 'M', 'L', 'V',
    'S', 'N', 'Q', 'O', 'T', 'G', 'X', 'U',
];

/// Two-letter cargo hold and unit load device designators
pub const CARGO_DESIGNATORS: &[&str] = &["LL", "LD", "MD", "PP", "PL", "UL", "LP"];

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default text encoding of input files
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Default file patterns picked up when an input is a directory
pub const DEFAULT_FILE_PATTERNS: &[&str] = &["*.sir", "*.SIR", "*.ssim", "*.SSIM", "*.sim", "*.csv", "*.txt"];

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SSIM_";

/// Configuration file name looked up under the user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under the user config directory
pub const APP_DIR_NAME: &str = "ssim-processor";

/// Default progress bar template
pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {msg}";

/// Default spinner template used for single-file runs
pub const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

/// Build the default number of worker tasks
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1)
}

/// Position of a month abbreviation, 1-based
pub fn month_number(abbreviation: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbreviation))
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("JAN"), Some(1));
        assert_eq!(month_number("oct"), Some(10));
        assert_eq!(month_number("DEC"), Some(12));
        assert_eq!(month_number("XXX"), None);
    }

    #[test]
    fn test_designator_tables_do_not_overlap() {
        for cargo in CARGO_DESIGNATORS {
            assert_eq!(cargo.len(), 2);
        }
        assert!(SEAT_CLASS_DESIGNATORS.contains(&'Y'));
        assert!(!SEAT_CLASS_DESIGNATORS.contains(&'1'));
    }

    #[test]
    fn test_default_worker_count_positive() {
        assert!(default_worker_count() >= 1);
    }
}
