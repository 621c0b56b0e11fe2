//! SSIM Processor Library
//!
//! A Rust library for turning IATA SSIM-family schedule messages (SIR slot
//! messages, SIM fixed-column data sets and a semicolon-separated CSV export)
//! into one record per individual scheduled operating day.
//!
//! This library provides tools for:
//! - Detecting the message sub-format of a schedule file
//! - Parsing header, body and footer records through a registry of record grammars
//! - Resolving partial and season-relative dates into calendar dates
//! - Uniformizing arrival/departure/return rows into canonical slots
//! - Decoding aircraft seating/cargo configuration strings
//! - Expanding recurring slots into dated flights, and compressing them back
//! - Writing flights as CSV, Parquet or JSON
//!
//! ```no_run
//! # fn main() -> ssim_processor::Result<()> {
//! let slot_file = ssim_processor::read("schedule.sir", None, None)?;
//! let expansion = ssim_processor::expand_slots(&slot_file.slots, slot_file.header.season.as_ref())?;
//! println!("{} slots -> {} flights", slot_file.slots.len(), expansion.flights.len());
//! # Ok(())
//! # }
//! ```

use std::path::Path;

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod aircraft_configuration;
        pub mod dates;
        pub mod expander;
        pub mod flight_writer;
        pub mod grammar;
        pub mod ssim_parser;
        pub mod uniformizer;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    AircraftConfiguration, DaysOfOperation, Diagnostic, DiagnosticKind, Direction, Flight, Footer,
    Header, Season, Slot, SourceFormat,
};
pub use app::services::aircraft_configuration::explode_aircraft_configuration;
pub use app::services::dates::season::find_season_dates;
pub use app::services::expander::{Expansion, ExpansionStats, compress_flights};
pub use app::services::ssim_parser::{SlotFile, SsimReader};
pub use config::Config;

/// Result type alias for the SSIM processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SSIM processing operations
///
/// Only conditions that abort a file, a record or a CLI run are errors.
/// Line-level problems are collected as [`Diagnostic`]s instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Neither the SIR, SIM nor CSV grammar matched the start of the file
    #[error("Unrecognized schedule format in file '{file}'")]
    UnrecognizedFormat { file: String },

    /// A start/end-of-season sentinel was found but no season is known
    #[error("Missing season context: {context}")]
    MissingSeasonContext { context: String },

    /// A date or time token could not be resolved to a calendar value
    #[error("Malformed date token '{token}': {reason}")]
    MalformedDateToken { token: String, reason: String },

    /// A slot violates its invariants (empty weekday mask, inverted window, ...)
    #[error("Invalid slot: {message}")]
    InvalidSlot { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Text could not be decoded with the requested encoding
    #[error("Encoding error ({encoding}): {message}")]
    Encoding { encoding: String, message: String },

    /// A record grammar failed to compile
    #[error("Grammar pattern '{pattern}' failed to compile")]
    Grammar {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Recurrence rule construction or evaluation failed
    #[error("Recurrence error: {message}")]
    Recurrence { message: String },

    /// Output writing error
    #[error("Output writing error: {message}")]
    OutputWriting {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an unrecognized format error
    pub fn unrecognized_format(file: impl Into<String>) -> Self {
        Self::UnrecognizedFormat { file: file.into() }
    }

    /// Create a missing season context error
    pub fn missing_season_context(context: impl Into<String>) -> Self {
        Self::MissingSeasonContext {
            context: context.into(),
        }
    }

    /// Create a malformed date token error
    pub fn malformed_date_token(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDateToken {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid slot error
    pub fn invalid_slot(message: impl Into<String>) -> Self {
        Self::InvalidSlot {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an encoding error
    pub fn encoding(encoding: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding {
            encoding: encoding.into(),
            message: message.into(),
        }
    }

    /// Create a grammar compilation error
    pub fn grammar(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Grammar {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a recurrence error
    pub fn recurrence(message: impl Into<String>) -> Self {
        Self::Recurrence {
            message: message.into(),
        }
    }

    /// Create an output writing error
    pub fn output_writing(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::OutputWriting {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error only invalidates a single record rather than a file
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            Error::MalformedDateToken { .. }
                | Error::MissingSeasonContext { .. }
                | Error::InvalidSlot { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(error: polars::error::PolarsError) -> Self {
        Self::OutputWriting {
            message: "Polars operation failed".to_string(),
            source: Box::new(error),
        }
    }
}

/// Read, detect, parse and uniformize a schedule file into canonical slots
///
/// `airport_code` restricts SIM legs to the ones touching that airport and
/// overrides the SIR clearance airport. `encoding` defaults to UTF-8.
pub fn read(
    path: impl AsRef<Path>,
    airport_code: Option<&str>,
    encoding: Option<&str>,
) -> Result<SlotFile> {
    let reader = SsimReader::with_defaults()?;
    reader.read(path.as_ref(), airport_code, encoding)
}

/// Expand slots into individual flights
///
/// `season` is only consulted for slots whose validity window still carries
/// an open start/end-of-season bound.
pub fn expand_slots(slots: &[Slot], season: Option<&Season>) -> Result<Expansion> {
    app::services::expander::expand_slots(slots, season, constants::DEFAULT_YEAR_PREFIX)
}
