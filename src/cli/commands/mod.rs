//! Command implementations for the SSIM processor CLI
//!
//! Each command lives in its own module:
//! - `convert`: expand schedule files into flight files
//! - `inspect`: report format, header, footer and diagnostics of one file

pub mod convert;
pub mod inspect;
pub mod shared;

pub use shared::ConversionStats;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Dispatch to the subcommand handler
pub async fn run(args: Args) -> Result<ConversionStats> {
    match args.command {
        Some(Commands::Convert(convert_args)) => convert::run_convert(convert_args).await,
        Some(Commands::Inspect(inspect_args)) => inspect::run_inspect(inspect_args).await,
        None => Err(Error::configuration("No command given")),
    }
}
