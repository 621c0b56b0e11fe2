//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `SSIM_*` environment variables. Command-line flags are applied last
//! by the CLI layer.

use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_ENCODING, DEFAULT_FILE_PATTERNS, DEFAULT_YEAR_PREFIX,
    ENV_PREFIX, default_worker_count,
};
use crate::{Error, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Text encodings accepted for input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Strict UTF-8, invalid sequences are an error
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// UTF-8 with invalid sequences replaced
    #[serde(rename = "utf-8-lossy", alias = "utf8-lossy", alias = "lossy")]
    Utf8Lossy,
    /// ISO-8859-1, every byte maps to the code point of the same value
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl TextEncoding {
    /// Decode raw file bytes
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| Error::encoding(self.to_string(), e.to_string())),
            TextEncoding::Utf8Lossy => Ok(String::from_utf8_lossy(bytes).into_owned()),
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Lossy => "utf-8-lossy",
            TextEncoding::Latin1 => "latin-1",
        };
        f.write_str(name)
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-8-lossy" | "utf8-lossy" | "lossy" => Ok(TextEncoding::Utf8Lossy),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            other => Err(Error::encoding(other, "unsupported encoding")),
        }
    }
}

/// Output file formats for expanded flights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
    Json,
}

impl OutputFormat {
    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" | "pq" => Ok(OutputFormat::Parquet),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::configuration(format!(
                "Unknown output format '{}'. Valid options: csv, parquet, json",
                other
            ))),
        }
    }
}

/// Supported compression algorithms for parquet output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    Snappy,
    Zstd,
    Lz4,
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Reading and parsing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Century prefix for two-digit years
    pub year_prefix: String,

    /// Encoding of input files
    pub encoding: TextEncoding,

    /// Restrict SIM legs to this airport and override the SIR clearance airport
    pub airport_code: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            year_prefix: DEFAULT_YEAR_PREFIX.to_string(),
            encoding: TextEncoding::Utf8,
            airport_code: None,
        }
    }
}

/// Output writing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Column separator for CSV output
    pub csv_separator: char,

    /// Carry the raw source line into every output row
    pub include_raw: bool,

    pub compression: CompressionAlgorithm,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            csv_separator: ',',
            include_raw: true,
            compression: CompressionAlgorithm::Snappy,
        }
    }
}

/// Batch processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of files converted concurrently
    pub workers: usize,

    /// Glob patterns used when an input is a directory
    pub file_patterns: Vec<String>,

    /// Overwrite existing output files
    pub force_overwrite: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            file_patterns: DEFAULT_FILE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            force_overwrite: false,
        }
    }
}

/// Global configuration for SSIM processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reader: ReaderConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

impl Config {
    /// Default location of the configuration file
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Invalid configuration file: {}", e)))
    }

    /// Defaults, then the given or default TOML file, then environment overrides
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::file_not_found(path.display().to_string()));
                }
                Self::load_from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    debug!("Loading configuration from {}", path.display());
                    Self::load_from_file(&path)?
                }
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SSIM_*` overrides through a variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(prefix) = var("YEAR_PREFIX") {
            debug!("Environment override: year_prefix = {}", prefix);
            self.reader.year_prefix = prefix;
        }
        if let Some(encoding) = var("ENCODING") {
            self.reader.encoding = encoding.parse()?;
        }
        if let Some(airport) = var("AIRPORT") {
            self.reader.airport_code = Some(airport.to_ascii_uppercase());
        }
        if let Some(format) = var("OUTPUT_FORMAT") {
            self.output.format = format.parse()?;
        }
        if let Some(workers) = var("WORKERS") {
            self.processing.workers = workers.parse().map_err(|_| {
                Error::configuration(format!("{}WORKERS must be a number, got '{}'", ENV_PREFIX, workers))
            })?;
        }
        Ok(())
    }

    /// Check settings for consistency
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.reader.year_prefix;
        if prefix.len() != 2 || !prefix.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::configuration(format!(
                "year_prefix must be two digits, got '{}'",
                prefix
            )));
        }

        if let Some(airport) = &self.reader.airport_code {
            if airport.len() != 3 || !airport.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Error::configuration(format!(
                    "airport_code must be a three-character code, got '{}'",
                    airport
                )));
            }
        }

        if !self.output.csv_separator.is_ascii() {
            return Err(Error::configuration("csv_separator must be an ASCII character"));
        }

        if self.processing.workers == 0 {
            return Err(Error::configuration("workers must be at least 1"));
        }

        Ok(())
    }

    /// Override the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.processing.workers = workers;
        self
    }

    /// Override the century prefix
    pub fn with_year_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reader.year_prefix = prefix.into();
        self
    }

    /// Override the output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    /// Override the airport filter
    pub fn with_airport_code(mut self, airport: impl Into<String>) -> Self {
        self.reader.airport_code = Some(airport.into());
        self
    }

    /// Override the input encoding
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.reader.encoding = encoding;
        self
    }

    /// Enable overwriting of existing output files
    pub fn with_force_overwrite(mut self) -> Self {
        self.processing.force_overwrite = true;
        self
    }
}
