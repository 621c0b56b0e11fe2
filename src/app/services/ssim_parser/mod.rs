//! SSIM schedule message reader
//!
//! Reads SIR slot messages, SIM fixed-column data sets and the CSV export
//! into canonical [`Slot`](crate::app::models::Slot)s.
//!
//! ## Architecture
//!
//! - [`detector`] - Sub-format detection from the leading bytes of a file
//! - [`parser`] - Reading, section splitting and orchestration
//! - [`header`] - Header and footer extraction
//! - [`record_parser`] - Body line matching against the record grammars
//! - [`csv_reader`] - Rows of the semicolon-separated export
//! - [`field_parsers`] - Small token helpers shared by the above
//! - [`stats`] - Parsing statistics and result structures
//!
//! ## Usage
//!
//! ```no_run
//! use ssim_processor::app::services::ssim_parser::SsimReader;
//!
//! # fn example() -> ssim_processor::Result<()> {
//! let reader = SsimReader::with_defaults()?;
//! let slot_file = reader.read(std::path::Path::new("schedule.sir"), None, None)?;
//!
//! println!("Read {} slots from {} lines",
//!          slot_file.slots.len(),
//!          slot_file.stats.total_lines);
//! # Ok(())
//! # }
//! ```

pub mod csv_reader;
pub mod detector;
pub mod field_parsers;
pub mod header;
pub mod parser;
pub mod record_parser;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use detector::detect_format;
pub use parser::SsimReader;
pub use stats::{ParseStats, ParsedMessage, SlotFile};
