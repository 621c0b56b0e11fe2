//! Flight output
//!
//! Flattens expanded flights into one row per flight and writes them as
//! CSV or Parquet through a polars `DataFrame`, or as a JSON array.

use crate::app::models::{Flight, TimeReference};
use crate::config::{OutputConfig, OutputFormat};
use crate::{Error, Result};
use polars::prelude::{
    Column, CsvWriter, DataFrame, NamedFrom, ParquetWriter as PolarsParquetWriter, SerWriter,
    Series,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One output row; field order is the column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRow {
    pub direction: String,
    pub source_format: String,
    pub action_code: Option<String>,
    pub airline_designator: Option<String>,
    pub flight_number: Option<String>,
    pub operational_suffix: Option<String>,
    pub service_type: Option<String>,
    pub aircraft_type: Option<String>,
    pub airport: Option<String>,
    pub station: Option<String>,
    pub second_station: Option<String>,
    pub flight_date: String,
    pub flight_datetime_utc: Option<String>,
    pub flight_datetime_local: Option<String>,
    pub time_reference: Option<String>,
    pub day_offset: u32,
    pub frequency_rate: u32,
    pub seats: Option<u32>,
    pub aircraft_configuration: Option<String>,
    pub aircraft_version: Option<String>,
    pub additional_schedule_information: Option<String>,
    pub season: Option<String>,
    pub line_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl FlightRow {
    pub fn from_flight(flight: &Flight, include_raw: bool) -> Self {
        Self {
            direction: flight.direction.code().to_string(),
            source_format: flight.source_format.to_string(),
            action_code: flight.action_code.clone(),
            airline_designator: flight.airline_designator.clone(),
            flight_number: flight.flight_number.clone(),
            operational_suffix: flight.operational_suffix.clone(),
            service_type: flight.service_type.clone(),
            aircraft_type: flight.aircraft_type.clone(),
            airport: flight.airport.clone(),
            station: flight.station.clone(),
            second_station: flight.second_station.clone(),
            flight_date: flight.flight_date.format(DATE_FORMAT).to_string(),
            flight_datetime_utc: flight
                .flight_datetime_utc
                .map(|at| at.format(DATETIME_FORMAT).to_string()),
            flight_datetime_local: flight
                .flight_datetime_local
                .map(|at| at.format(DATETIME_FORMAT).to_string()),
            time_reference: flight.scheduled_time.map(|scheduled| {
                match scheduled.reference {
                    TimeReference::Utc => "UTC",
                    TimeReference::Local => "LOCAL",
                }
                .to_string()
            }),
            day_offset: u32::from(flight.day_offset),
            frequency_rate: flight.frequency_rate,
            seats: flight.aircraft_configuration.seats,
            aircraft_configuration: flight.aircraft_configuration.raw.clone(),
            aircraft_version: flight.aircraft_configuration.version.clone(),
            additional_schedule_information: flight.additional_schedule_information.clone(),
            season: flight.season.map(|season| season.to_string()),
            line_number: flight.line_number as u64,
            raw: include_raw.then(|| flight.raw.clone()),
        }
    }
}

fn text_column<F>(rows: &[FlightRow], name: &str, value: F) -> Column
where
    F: Fn(&FlightRow) -> Option<String>,
{
    let values: Vec<Option<String>> = rows.iter().map(value).collect();
    Series::new(name.into(), values).into()
}

/// Writer for expanded flights
#[derive(Debug, Clone)]
pub struct FlightWriter {
    config: OutputConfig,
}

impl FlightWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn rows(&self, flights: &[Flight]) -> Vec<FlightRow> {
        flights
            .iter()
            .map(|flight| FlightRow::from_flight(flight, self.config.include_raw))
            .collect()
    }

    /// One column per row field, typed where the field is numeric
    pub fn to_dataframe(&self, flights: &[Flight]) -> Result<DataFrame> {
        let rows = self.rows(flights);

        let mut columns = vec![
            text_column(&rows, "direction", |r| Some(r.direction.clone())),
            text_column(&rows, "source_format", |r| Some(r.source_format.clone())),
            text_column(&rows, "action_code", |r| r.action_code.clone()),
            text_column(&rows, "airline_designator", |r| r.airline_designator.clone()),
            text_column(&rows, "flight_number", |r| r.flight_number.clone()),
            text_column(&rows, "operational_suffix", |r| r.operational_suffix.clone()),
            text_column(&rows, "service_type", |r| r.service_type.clone()),
            text_column(&rows, "aircraft_type", |r| r.aircraft_type.clone()),
            text_column(&rows, "airport", |r| r.airport.clone()),
            text_column(&rows, "station", |r| r.station.clone()),
            text_column(&rows, "second_station", |r| r.second_station.clone()),
            text_column(&rows, "flight_date", |r| Some(r.flight_date.clone())),
            text_column(&rows, "flight_datetime_utc", |r| r.flight_datetime_utc.clone()),
            text_column(&rows, "flight_datetime_local", |r| {
                r.flight_datetime_local.clone()
            }),
            text_column(&rows, "time_reference", |r| r.time_reference.clone()),
            Series::new(
                "day_offset".into(),
                rows.iter().map(|r| r.day_offset).collect::<Vec<u32>>(),
            )
            .into(),
            Series::new(
                "frequency_rate".into(),
                rows.iter().map(|r| r.frequency_rate).collect::<Vec<u32>>(),
            )
            .into(),
            Series::new(
                "seats".into(),
                rows.iter().map(|r| r.seats).collect::<Vec<Option<u32>>>(),
            )
            .into(),
            text_column(&rows, "aircraft_configuration", |r| {
                r.aircraft_configuration.clone()
            }),
            text_column(&rows, "aircraft_version", |r| r.aircraft_version.clone()),
            text_column(&rows, "additional_schedule_information", |r| {
                r.additional_schedule_information.clone()
            }),
            text_column(&rows, "season", |r| r.season.clone()),
            Series::new(
                "line_number".into(),
                rows.iter().map(|r| r.line_number).collect::<Vec<u64>>(),
            )
            .into(),
        ];
        if self.config.include_raw {
            columns.push(text_column(&rows, "raw", |r| r.raw.clone()));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Write flights to `path` in the configured format, returning the row count
    pub fn write(&self, flights: &[Flight], path: &Path) -> Result<usize> {
        debug!(
            "Writing {} flights to {} as {}",
            flights.len(),
            path.display(),
            self.config.format
        );
        let file = File::create(path)
            .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;

        match self.config.format {
            OutputFormat::Csv => {
                let mut df = self.to_dataframe(flights)?;
                let separator = u8::try_from(self.config.csv_separator).map_err(|_| {
                    Error::configuration(format!(
                        "CSV separator '{}' is not a single byte",
                        self.config.csv_separator
                    ))
                })?;
                let mut writer = BufWriter::new(file);
                CsvWriter::new(&mut writer)
                    .include_header(true)
                    .with_separator(separator)
                    .finish(&mut df)?;
            }
            OutputFormat::Parquet => {
                let mut df = self.to_dataframe(flights)?;
                PolarsParquetWriter::new(file)
                    .with_compression(self.config.compression.to_polars_compression())
                    .finish(&mut df)?;
            }
            OutputFormat::Json => {
                let rows = self.rows(flights);
                serde_json::to_writer_pretty(BufWriter::new(file), &rows).map_err(|e| {
                    Error::output_writing(
                        format!("Failed to write JSON to {}", path.display()),
                        Box::new(e),
                    )
                })?;
            }
        }

        info!("Wrote {} flights to {}", flights.len(), path.display());
        Ok(flights.len())
    }
}
