//! Data models for SSIM processing
//!
//! This module contains the canonical schedule types shared by every
//! sub-format: seasons, weekday masks, validity windows, slots and the
//! dated flights they expand into.

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod records;

// =============================================================================
// Formats and Directions
// =============================================================================

/// Schedule message sub-format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceFormat {
    /// Slot clearance / schedule interchange message
    Sir,
    /// Fixed-column standard schedule data set
    Sim,
    /// Semicolon-separated tabular export
    Csv,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Sir => "SIR",
            SourceFormat::Sim => "SIM",
            SourceFormat::Csv => "CSV",
        };
        f.write_str(name)
    }
}

/// Whether a slot describes an arrival or a departure at the reference airport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "A")]
    Arrival,
    #[serde(rename = "D")]
    Departure,
}

impl Direction {
    /// Single-letter code
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Arrival => "A",
            Direction::Departure => "D",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(Direction::Arrival),
            "D" | "d" => Ok(Direction::Departure),
            other => Err(Error::invalid_slot(format!("Unknown direction '{}'", other))),
        }
    }
}

// =============================================================================
// Seasons
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonKind {
    Summer,
    Winter,
}

/// IATA scheduling season such as `S17` or `W17`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Season {
    pub kind: SeasonKind,
    /// Two-digit year the season starts in
    pub year: u8,
}

impl Season {
    pub fn new(kind: SeasonKind, year: u8) -> Result<Self> {
        if year > 99 {
            return Err(Error::malformed_date_token(
                year.to_string(),
                "season year must have two digits",
            ));
        }
        Ok(Self { kind, year })
    }

    /// Four-digit calendar year in which the season starts
    pub fn start_year(&self, year_prefix: &str) -> Result<i32> {
        let text = format!("{}{:02}", year_prefix, self.year);
        text.parse::<i32>()
            .map_err(|_| Error::malformed_date_token(text, "invalid season year"))
    }

    pub fn is_winter(&self) -> bool {
        self.kind == SeasonKind::Winter
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.kind {
            SeasonKind::Summer => 'S',
            SeasonKind::Winter => 'W',
        };
        write!(f, "{}{:02}", letter, self.year)
    }
}

impl FromStr for Season {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        let mut chars = code.chars();
        let kind = match chars.next() {
            Some('S') | Some('s') => SeasonKind::Summer,
            Some('W') | Some('w') => SeasonKind::Winter,
            _ => {
                return Err(Error::malformed_date_token(
                    code,
                    "season code must start with S or W",
                ));
            }
        };
        let digits = chars.as_str();
        if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::malformed_date_token(
                code,
                "season code must end with a two-digit year",
            ));
        }
        let year = digits
            .parse::<u8>()
            .map_err(|_| Error::malformed_date_token(code, "invalid season year"))?;
        Season::new(kind, year)
    }
}

impl Serialize for Season {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Season {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Days of Operation
// =============================================================================

/// Set of weekdays a slot operates on, Monday = 1 through Sunday = 7
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DaysOfOperation(u8);

impl DaysOfOperation {
    pub const ALL: DaysOfOperation = DaysOfOperation(0b111_1111);

    pub fn empty() -> Self {
        Self(0)
    }

    /// Build a mask from any text containing the digits 1 to 7
    ///
    /// Positional (`1 3 5 7`), compact (`135`) and zero-padded (`1030507`)
    /// forms all work. Other characters are ignored.
    pub fn from_ssim(text: &str) -> Self {
        let mut mask = Self::empty();
        for c in text.chars() {
            if let Some(day) = c.to_digit(10).filter(|d| (1..=7).contains(d)) {
                mask.0 |= 1 << (day - 1);
            }
        }
        mask
    }

    pub fn from_weekdays<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let mut mask = Self::empty();
        for day in days {
            mask.insert(day);
        }
        mask
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Member weekdays in Monday-first order
    pub fn weekdays(&self) -> Vec<Weekday> {
        (0..7u8)
            .filter(|bit| self.0 & (1 << bit) != 0)
            .filter_map(|bit| Weekday::try_from(bit).ok())
            .collect()
    }
}

impl fmt::Display for DaysOfOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in 0..7u8 {
            if self.0 & (1 << bit) != 0 {
                write!(f, "{}", bit + 1)?;
            } else {
                f.write_str(" ")?;
            }
        }
        Ok(())
    }
}

impl Serialize for DaysOfOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DaysOfOperation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(DaysOfOperation::from_ssim(&text))
    }
}

// =============================================================================
// Validity Window
// =============================================================================

/// One end of a validity window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodBound {
    Date(NaiveDate),
    /// Start or end of the season, resolved once a season is known
    OpenSeason,
}

impl PeriodBound {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            PeriodBound::Date(date) => Some(*date),
            PeriodBound::OpenSeason => None,
        }
    }
}

/// Inclusive validity window of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatingPeriod {
    pub from: PeriodBound,
    pub to: PeriodBound,
}

impl OperatingPeriod {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: PeriodBound::Date(from),
            to: PeriodBound::Date(to),
        }
    }
}

// =============================================================================
// Times
// =============================================================================

/// Clock a scheduled time is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeReference {
    Utc,
    Local,
}

/// Time of day of a slot together with its clock reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledTime {
    pub time: NaiveTime,
    pub reference: TimeReference,
    /// Local time minus UTC, when known
    pub utc_offset_minutes: Option<i32>,
}

impl ScheduledTime {
    pub fn utc(time: NaiveTime) -> Self {
        Self {
            time,
            reference: TimeReference::Utc,
            utc_offset_minutes: None,
        }
    }
}

// =============================================================================
// Aircraft Configuration
// =============================================================================

/// Decoded seating/cargo configuration of an aircraft
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AircraftConfiguration {
    /// Source text, trimmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,

    /// Total passenger seats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,

    /// Seats per passenger class designator
    pub classes: BTreeMap<String, u32>,

    /// Cargo positions per cargo designator
    pub cargo: BTreeMap<String, u32>,

    /// Designators that are neither class nor cargo codes
    pub unknown: BTreeMap<String, u32>,

    /// Aircraft version following the `VV` separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl AircraftConfiguration {
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }
}

// =============================================================================
// Header and Footer
// =============================================================================

/// File-level metadata read from the message header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SourceFormat>,
    /// SIR message type tag (SCR, SAL, ...) or SIM title
    pub file_type: Option<String>,
    pub season: Option<Season>,
    pub creator_reference: Option<String>,
    /// Message or data set creation date as written in the file
    pub message_date: Option<String>,
    /// Clearance/advice airport of a SIR message
    pub airport: Option<String>,
    pub message_reference: Option<String>,
    /// Airline of a SIM carrier record
    pub airline_designator: Option<String>,
    /// SIM time mode: U for UTC, L for local
    pub time_mode: Option<TimeReference>,
    pub validity_from: Option<String>,
    pub validity_to: Option<String>,
}

/// One `SI`/`GI` item of a SIR footer, continuation lines joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterItem {
    pub tag: String,
    pub text: String,
}

/// Trailing free text or trailer record of a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub text: String,
    pub items: Vec<FooterItem>,
    /// Serial number check reference of a SIM trailer record
    pub serial_check_reference: Option<String>,
}

// =============================================================================
// Diagnostics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnparsedLine,
    UnknownConfigurationDesignator,
    MalformedDateToken,
    MissingSeasonContext,
    BadMidnight,
    DroppedRecord,
    AirportMismatch,
    EmptyExpansion,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::UnparsedLine => "unparsed line",
            DiagnosticKind::UnknownConfigurationDesignator => "unknown configuration designator",
            DiagnosticKind::MalformedDateToken => "malformed date token",
            DiagnosticKind::MissingSeasonContext => "missing season context",
            DiagnosticKind::BadMidnight => "bad midnight",
            DiagnosticKind::DroppedRecord => "dropped record",
            DiagnosticKind::AirportMismatch => "airport mismatch",
            DiagnosticKind::EmptyExpansion => "empty expansion",
        };
        f.write_str(name)
    }
}

/// Non-fatal problem found while reading or expanding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based line number in the source file, when known
    pub line: Option<usize>,
    pub message: String,
    pub raw: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            message: message.into(),
            raw: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Diagnostic for a record rejected by a record-level error
    pub fn from_error(error: &Error, line: usize, raw: &str) -> Self {
        let kind = match error {
            Error::MalformedDateToken { .. } => DiagnosticKind::MalformedDateToken,
            Error::MissingSeasonContext { .. } => DiagnosticKind::MissingSeasonContext,
            _ => DiagnosticKind::DroppedRecord,
        };
        Self::new(kind, error.to_string()).at_line(line).with_raw(raw)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}: {}", line, self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

// =============================================================================
// Slots and Flights
// =============================================================================

/// Canonical recurring schedule entry for one direction at one airport
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub direction: Direction,
    pub source_format: SourceFormat,
    pub action_code: Option<String>,
    pub airline_designator: Option<String>,
    pub flight_number: Option<String>,
    pub operational_suffix: Option<String>,
    pub service_type: Option<String>,
    pub aircraft_type: Option<String>,
    /// Reference airport of the slot
    pub airport: Option<String>,
    /// Previous station for arrivals, next station for departures
    pub station: Option<String>,
    /// Origin for arrivals, destination for departures
    pub second_station: Option<String>,
    pub period: OperatingPeriod,
    pub days_of_operation: DaysOfOperation,
    /// Operate every n-th week
    pub frequency_rate: u32,
    pub scheduled_time: Option<ScheduledTime>,
    /// Days between the operating day and the day the time falls on
    pub day_offset: u8,
    pub aircraft_configuration: AircraftConfiguration,
    pub additional_schedule_information: Option<String>,
    pub season: Option<Season>,
    /// Source line the slot was built from
    pub raw: String,
    /// 1-based line number of the source line
    pub line_number: usize,
}

impl Slot {
    /// Check the slot invariants
    pub fn validate(&self) -> Result<()> {
        if self.days_of_operation.is_empty() {
            return Err(Error::invalid_slot(format!(
                "{}: empty days of operation",
                self.designator()
            )));
        }
        if self.frequency_rate < 1 {
            return Err(Error::invalid_slot(format!(
                "{}: frequency rate must be at least 1",
                self.designator()
            )));
        }
        if let (Some(from), Some(to)) = (self.period.from.date(), self.period.to.date()) {
            if from > to {
                return Err(Error::invalid_slot(format!(
                    "{}: period starts {} after it ends {}",
                    self.designator(),
                    from,
                    to
                )));
            }
        }
        Ok(())
    }

    pub fn is_overnight(&self) -> bool {
        self.day_offset > 0
    }

    /// Airline, flight number and suffix, e.g. `BA123A`
    pub fn designator(&self) -> String {
        format!(
            "{}{}{}",
            self.airline_designator.as_deref().unwrap_or(""),
            self.flight_number.as_deref().unwrap_or(""),
            self.operational_suffix.as_deref().unwrap_or("")
        )
    }
}

/// One individual scheduled operation on a specific calendar date
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flight {
    pub direction: Direction,
    pub source_format: SourceFormat,
    pub action_code: Option<String>,
    pub airline_designator: Option<String>,
    pub flight_number: Option<String>,
    pub operational_suffix: Option<String>,
    pub service_type: Option<String>,
    pub aircraft_type: Option<String>,
    pub airport: Option<String>,
    pub station: Option<String>,
    pub second_station: Option<String>,
    /// Calendar date the time falls on, day offset applied
    pub flight_date: NaiveDate,
    pub flight_datetime_utc: Option<NaiveDateTime>,
    pub flight_datetime_local: Option<NaiveDateTime>,
    pub scheduled_time: Option<ScheduledTime>,
    pub day_offset: u8,
    pub frequency_rate: u32,
    pub aircraft_configuration: AircraftConfiguration,
    pub additional_schedule_information: Option<String>,
    pub season: Option<Season>,
    pub raw: String,
    pub line_number: usize,
}

impl Flight {
    /// Build the flight of `slot` operating on `operating_date`
    pub fn from_slot(slot: &Slot, operating_date: NaiveDate) -> Self {
        let flight_date = operating_date + chrono::Duration::days(i64::from(slot.day_offset));

        let (utc, local) = match slot.scheduled_time {
            Some(scheduled) => {
                let at = flight_date.and_time(scheduled.time);
                let offset = scheduled
                    .utc_offset_minutes
                    .map(|m| chrono::Duration::minutes(i64::from(m)));
                match scheduled.reference {
                    TimeReference::Utc => (Some(at), offset.map(|o| at + o)),
                    TimeReference::Local => (offset.map(|o| at - o), Some(at)),
                }
            }
            None => (None, None),
        };

        Self {
            direction: slot.direction,
            source_format: slot.source_format,
            action_code: slot.action_code.clone(),
            airline_designator: slot.airline_designator.clone(),
            flight_number: slot.flight_number.clone(),
            operational_suffix: slot.operational_suffix.clone(),
            service_type: slot.service_type.clone(),
            aircraft_type: slot.aircraft_type.clone(),
            airport: slot.airport.clone(),
            station: slot.station.clone(),
            second_station: slot.second_station.clone(),
            flight_date,
            flight_datetime_utc: utc,
            flight_datetime_local: local,
            scheduled_time: slot.scheduled_time,
            day_offset: slot.day_offset,
            frequency_rate: slot.frequency_rate,
            aircraft_configuration: slot.aircraft_configuration.clone(),
            additional_schedule_information: slot.additional_schedule_information.clone(),
            season: slot.season,
            raw: slot.raw.clone(),
            line_number: slot.line_number,
        }
    }

    /// Date the slot operated on before the day offset was applied
    pub fn operating_date(&self) -> NaiveDate {
        self.flight_date - chrono::Duration::days(i64::from(self.day_offset))
    }

    pub fn designator(&self) -> String {
        format!(
            "{}{}{}",
            self.airline_designator.as_deref().unwrap_or(""),
            self.flight_number.as_deref().unwrap_or(""),
            self.operational_suffix.as_deref().unwrap_or("")
        )
    }
}
