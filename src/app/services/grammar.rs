//! Record grammar registry
//!
//! Every record shape the reader understands is described by a named,
//! prioritised regular expression. The registry compiles them once and is
//! shared read-only between parsers.

use crate::app::models::SourceFormat;
use crate::app::models::records::FieldMap;
use crate::constants::SIM_RECORD_WIDTH;
use crate::{Error, Result};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Record shape a grammar produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordShape {
    SirHeader,
    ArrivalOnly,
    DepartureOnly,
    Combined,
    SimHeader,
    SimCarrier,
    FlightLeg,
    SegmentData,
    SimTrailer,
}

impl RecordShape {
    /// Format whose files contain this shape
    pub fn format(&self) -> SourceFormat {
        match self {
            RecordShape::SirHeader
            | RecordShape::ArrivalOnly
            | RecordShape::DepartureOnly
            | RecordShape::Combined => SourceFormat::Sir,
            RecordShape::SimHeader
            | RecordShape::SimCarrier
            | RecordShape::FlightLeg
            | RecordShape::SegmentData
            | RecordShape::SimTrailer => SourceFormat::Sim,
        }
    }

    /// Whether the shape describes a body line rather than a header or trailer
    pub fn is_body(&self) -> bool {
        matches!(
            self,
            RecordShape::ArrivalOnly
                | RecordShape::DepartureOnly
                | RecordShape::Combined
                | RecordShape::FlightLeg
                | RecordShape::SegmentData
        )
    }
}

// =============================================================================
// SIR grammars
// =============================================================================

const SIR_HEADER: &str = concat!(
    r"^(?P<file_type>SAL|SAQ|SCR|SHL|SIR|SMA|WCR|WIR) *\n",
    r"/(?P<creator_reference>.*)\n",
    r"(?P<season>[SW][0-9]{2}) *\n",
    r"(?P<day_of_message>[0-9]{2})(?P<month_of_message>[A-Z]{3}) *\n",
    r"(?P<clearance_advice_airport>[A-Z]{3}) *(?:\n|\z)",
    r"(?:REYT/(?P<message_reference>.*)(?:\n|\z))?",
);

const SIR_ARRIVAL: &str = concat!(
    r"^(?P<action_code>[A-Z])",
    r"(?P<arrival_airline_designator>[A-Z]{2,3}|[A-Z][0-9]|[0-9][A-Z]|\w{2})?",
    r"(?P<arrival_flight_number>\d+[A-Z]*|\w+)?",
    r"(?P<arrival_operational_suffix>\w+)?",
    r"\s",
    r"(?P<period_of_operation_from>\d{2}[A-Z]{3})",
    r"(?P<period_of_operation_to>\d{2}[A-Z]{3})?",
    r"\s",
    r"(?:(?P<days_of_operation>\d{7})?\s)?",
    r"(?P<seats>\d{3})?",
    r"(?P<aircraft_type>\w{3})",
    r"\s",
    r"(?P<origin_station>[A-Z0-9]{3})?",
    r"(?P<previous_station>[A-Z0-9]{3})",
    r"(?P<scheduled_time_of_arrival_utc>\d{4})?",
    r"\s",
    r"(?P<arrival_service_type>[A-Z])",
    r"(?P<frequency_rate>\d)?",
);

const SIR_DEPARTURE: &str = concat!(
    r"^(?P<action_code>[A-Z])",
    r"\s",
    r"(?P<departure_airline_designator>[A-Z]{2,3}|[A-Z][0-9]|[0-9][A-Z]|\w{2})?",
    r"(?P<departure_flight_number>\d+[A-Z]*|\w+)?",
    r"(?P<departure_operational_suffix>\w+)?",
    r"\s",
    r"(?P<period_of_operation_from>\d{2}[A-Z]{3})",
    r"(?P<period_of_operation_to>\d{2}[A-Z]{3})?",
    r"\s",
    r"(?:(?P<days_of_operation>\d{7})\s)?",
    r"(?P<seats>\d{3})?",
    r"(?P<aircraft_type>\w{3})",
    r"\s",
    r"(?P<scheduled_time_of_departure_utc>\d{4})?",
    r"(?P<next_station>[A-Z0-9]{3})",
    r"(?P<destination_station>[A-Z0-9]{3})?",
    r"\s",
    r"(?P<departure_service_type>[A-Z])",
    r"(?P<frequency_rate>\d)?",
);

const SIR_COMBINED: &str = concat!(
    r"^(?P<action_code>[A-Z])",
    r"(?P<arrival_airline_designator>[A-Z]{2,3}|[A-Z][0-9]|[0-9][A-Z]|[A-Z]+)",
    r"(?P<arrival_flight_number>\d+)?",
    r"(?P<arrival_operational_suffix>[A-Z]{1,2})?",
    r"\s",
    r"(?P<departure_airline_designator>[A-Z]{2,3}|[A-Z][0-9]|[0-9][A-Z]|[A-Z]+)",
    r"(?P<departure_flight_number>\d+)?",
    r"(?P<departure_operational_suffix>[A-Z]{1,2})?",
    r"\s",
    r"(?P<period_of_operation_from>\d{2}[A-Z]{3})",
    r"(?P<period_of_operation_to>\d{2}[A-Z]{3})?",
    r"\s",
    r"(?P<days_of_operation>\d{7})?",
    r"\s",
    r"(?P<seats>\d{3})?",
    r"(?P<aircraft_type>\w{3})",
    r"\s",
    r"(?P<origin_station>[A-Z0-9]{3})?",
    r"(?P<previous_station>[A-Z0-9]{3})",
    r"(?P<scheduled_time_of_arrival_utc>\d{4})?",
    r"\s",
    r"(?P<scheduled_time_of_departure_utc>\d{4})?",
    r"(?P<overnight_indicator>[0-6])?",
    r"(?P<next_station>[A-Z0-9]{3})",
    r"(?P<destination_station>[A-Z0-9]{3})?",
    r"\s",
    r"(?P<arrival_service_type>[A-Z])",
    r"(?P<departure_service_type>[A-Z])",
    r"(?P<frequency_rate>\d)?",
);

/// Optional free-text remark joined onto the end of a SIR line
const SIR_REMARK_SUFFIX: &str = r"(?:\s+/\s*(?P<additional_schedule_information>.*)/)?";

// =============================================================================
// SIM layouts: (field name, width) after the one-character record type
// =============================================================================

pub const SIM_HEADER_LAYOUT: &[(&str, usize)] = &[
    ("title_of_contents", 34),
    ("spare_0", 5),
    ("number_of_seasons", 1),
    ("spare_1", 150),
    ("data_set_serial_number", 3),
    ("record_serial_number", 6),
];

pub const SIM_CARRIER_LAYOUT: &[(&str, usize)] = &[
    ("time_mode", 1),
    ("airline_designator", 3),
    ("spare_0", 5),
    ("season", 3),
    ("spare_1", 1),
    ("period_of_schedule_validity_from", 7),
    ("period_of_schedule_validity_to", 7),
    ("creation_date", 7),
    ("title_of_data", 29),
    ("release_date", 7),
    ("schedule_status", 1),
    ("creator_reference", 35),
    ("duplicate_airline_designator_marker", 1),
    ("general_information", 61),
    ("in_flight_service_information", 19),
    ("electronic_ticketing_information", 2),
    ("creation_time", 4),
    ("record_serial_number", 6),
];

pub const SIM_FLIGHT_LEG_LAYOUT: &[(&str, usize)] = &[
    ("operational_suffix", 1),
    ("airline_designator", 3),
    ("flight_number", 4),
    ("itinerary_variation_identifier", 2),
    ("leg_sequence_number", 2),
    ("service_type", 1),
    ("period_of_operation_from", 7),
    ("period_of_operation_to", 7),
    ("days_of_operation", 7),
    ("frequency_rate", 1),
    ("departure_station", 3),
    ("scheduled_time_of_passenger_departure", 4),
    ("scheduled_time_of_aircraft_departure", 4),
    ("utc_local_time_variation_departure", 5),
    ("passenger_terminal_departure", 2),
    ("arrival_station", 3),
    ("scheduled_time_of_aircraft_arrival", 4),
    ("scheduled_time_of_passenger_arrival", 4),
    ("utc_local_time_variation_arrival", 5),
    ("passenger_terminal_arrival", 2),
    ("aircraft_type", 3),
    ("passenger_reservations_booking_designator", 20),
    ("passenger_reservations_booking_modifier", 5),
    ("meal_service_note", 10),
    ("joint_operation_airline_designators", 9),
    ("minimum_connecting_time_status", 2),
    ("secure_flight_indicator", 1),
    ("spare_0", 5),
    ("itinerary_variation_identifier_overflow", 1),
    ("aircraft_owner", 3),
    ("cockpit_crew_employer", 3),
    ("cabin_crew_employer", 3),
    ("onward_airline_designator", 3),
    ("onward_flight_number", 4),
    ("aircraft_rotation_layover", 1),
    ("onward_operational_suffix", 1),
    ("spare_1", 1),
    ("flight_transit_layover", 1),
    ("operating_airline_disclosure", 1),
    ("traffic_restriction_code", 11),
    ("traffic_restriction_code_leg_overflow_indicator", 1),
    ("spare_2", 11),
    ("aircraft_configuration_version", 20),
    ("date_variation", 2),
    ("record_serial_number", 6),
];

pub const SIM_SEGMENT_DATA_LAYOUT: &[(&str, usize)] = &[
    ("operational_suffix", 1),
    ("airline_designator", 3),
    ("flight_number", 4),
    ("itinerary_variation_identifier", 2),
    ("leg_sequence_number", 2),
    ("service_type", 1),
    ("spare_0", 13),
    ("itinerary_variation_identifier_overflow", 1),
    ("board_point_indicator", 1),
    ("off_point_indicator", 1),
    ("data_element_identifier", 3),
    ("board_point", 3),
    ("off_point", 3),
    ("data", 155),
    ("record_serial_number", 6),
];

pub const SIM_TRAILER_LAYOUT: &[(&str, usize)] = &[
    ("spare_0", 1),
    ("airline_designator", 3),
    ("release_date", 7),
    ("spare_1", 175),
    ("serial_number_check_reference", 6),
    ("continuation_end_code", 1),
    ("record_serial_number", 6),
];

/// Total width of a fixed-column record, record type included
pub fn layout_width(layout: &[(&str, usize)]) -> usize {
    1 + layout.iter().map(|(_, width)| width).sum::<usize>()
}

fn fixed_width_source(record_type: char, layout: &[(&str, usize)]) -> String {
    let mut source = format!("^(?P<record_type>{})", record_type);
    for (name, width) in layout {
        source.push_str(&format!("(?P<{}>.{{{}}})", name, width));
    }
    source
}

// =============================================================================
// Patterns
// =============================================================================

/// One compiled, named record grammar
#[derive(Debug, Clone)]
pub struct GrammarPattern {
    pub name: &'static str,
    pub shape: RecordShape,
    /// Lower runs first; among several matches the last one wins
    pub priority: u8,
    /// Fields that must be present for a match to count
    pub required: &'static [&'static str],
    regex: Regex,
}

impl GrammarPattern {
    pub fn compile(
        name: &'static str,
        shape: RecordShape,
        priority: u8,
        required: &'static [&'static str],
        source: &str,
    ) -> Result<Self> {
        let regex = Regex::new(source).map_err(|e| Error::grammar(name, e))?;
        Ok(Self {
            name,
            shape,
            priority,
            required,
            regex,
        })
    }

    /// Match at the start of `text`, returning the fields and the match length
    pub fn captures(&self, text: &str) -> Option<(FieldMap, usize)> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?;
        let mut fields = FieldMap::new();
        for name in self.regex.capture_names().flatten() {
            if let Some(value) = caps.name(name) {
                fields.insert(name, value.as_str());
            }
        }
        if self.required.iter().all(|field| fields.contains(field)) {
            Some((fields, whole.end()))
        } else {
            None
        }
    }

    /// Match a single logical line
    pub fn match_line(&self, line: &str) -> Option<FieldMap> {
        self.captures(line).map(|(fields, _)| fields)
    }
}

/// Compiled set of every record grammar
#[derive(Debug, Clone)]
pub struct GrammarRegistry {
    patterns: Vec<GrammarPattern>,
}

impl GrammarRegistry {
    /// Compile the full grammar set
    pub fn new() -> Result<Self> {
        let remark = |source: &str| format!("{}{}", source, SIR_REMARK_SUFFIX);

        let mut patterns = vec![
            GrammarPattern::compile("sir_header", RecordShape::SirHeader, 0, &[], SIR_HEADER)?,
            GrammarPattern::compile(
                "sir_combined",
                RecordShape::Combined,
                1,
                &["period_of_operation_from", "previous_station", "next_station"],
                &remark(SIR_COMBINED),
            )?,
            GrammarPattern::compile(
                "sir_arrival",
                RecordShape::ArrivalOnly,
                2,
                &["period_of_operation_from", "previous_station"],
                &remark(SIR_ARRIVAL),
            )?,
            GrammarPattern::compile(
                "sir_departure",
                RecordShape::DepartureOnly,
                3,
                &["period_of_operation_from", "next_station"],
                &remark(SIR_DEPARTURE),
            )?,
            GrammarPattern::compile(
                "sim_record_1",
                RecordShape::SimHeader,
                0,
                &["title_of_contents"],
                &fixed_width_source('1', SIM_HEADER_LAYOUT),
            )?,
            GrammarPattern::compile(
                "sim_record_2",
                RecordShape::SimCarrier,
                0,
                &[],
                &fixed_width_source('2', SIM_CARRIER_LAYOUT),
            )?,
            GrammarPattern::compile(
                "sim_record_3",
                RecordShape::FlightLeg,
                1,
                &[
                    "airline_designator",
                    "period_of_operation_from",
                    "departure_station",
                    "arrival_station",
                ],
                &fixed_width_source('3', SIM_FLIGHT_LEG_LAYOUT),
            )?,
            GrammarPattern::compile(
                "sim_record_4",
                RecordShape::SegmentData,
                2,
                &["airline_designator"],
                &fixed_width_source('4', SIM_SEGMENT_DATA_LAYOUT),
            )?,
            GrammarPattern::compile(
                "sim_record_5",
                RecordShape::SimTrailer,
                0,
                &[],
                &fixed_width_source('5', SIM_TRAILER_LAYOUT),
            )?,
        ];
        patterns.sort_by_key(|p| (p.shape.format() == SourceFormat::Sim, p.priority));

        debug!("Compiled {} record grammars", patterns.len());
        Ok(Self { patterns })
    }

    /// Compile the grammar set behind a shared handle
    pub fn shared() -> Result<Arc<Self>> {
        Self::new().map(Arc::new)
    }

    pub fn patterns(&self) -> &[GrammarPattern] {
        &self.patterns
    }

    /// Grammar for a given shape
    pub fn get(&self, shape: RecordShape) -> Option<&GrammarPattern> {
        self.patterns.iter().find(|p| p.shape == shape)
    }

    /// Body-line grammars of a format in ascending priority
    pub fn line_patterns(&self, format: SourceFormat) -> Vec<&GrammarPattern> {
        self.patterns
            .iter()
            .filter(|p| p.shape.is_body() && p.shape.format() == format)
            .collect()
    }

    /// Shape-specific lookup that reports a missing grammar as an error
    pub fn require(&self, shape: RecordShape) -> Result<&GrammarPattern> {
        self.get(shape)
            .ok_or_else(|| Error::configuration(format!("No grammar registered for {:?}", shape)))
    }

    /// Fixed record width used by SIM records
    pub fn sim_record_width(&self) -> usize {
        SIM_RECORD_WIDTH
    }
}
