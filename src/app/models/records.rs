//! Parsed record shapes
//!
//! A body line matched by a record grammar becomes one of the variants of
//! [`ParsedRecord`]. Records keep field text as written; date and time
//! resolution happens later in the uniformizer.

use std::collections::BTreeMap;

/// A single source line with its 1-based position in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub number: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Named capture groups of a matched grammar, trimmed, blank groups absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: BTreeMap<String, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a captured value, dropping it when blank
    pub fn insert(&mut self, name: impl Into<String>, value: &str) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.fields.insert(name.into(), trimmed.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Airline designator, flight number and operational suffix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightDesignator {
    pub airline_designator: Option<String>,
    pub flight_number: Option<String>,
    pub operational_suffix: Option<String>,
}

impl FlightDesignator {
    fn take(fields: &mut FieldMap, prefix: &str) -> Self {
        Self {
            airline_designator: fields.take(&format!("{}_airline_designator", prefix)),
            flight_number: fields.take(&format!("{}_flight_number", prefix)),
            operational_suffix: fields.take(&format!("{}_operational_suffix", prefix)),
        }
    }
}

/// SIR line carrying both an arrival and a departure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedRecord {
    pub action_code: Option<String>,
    pub arrival: FlightDesignator,
    pub departure: FlightDesignator,
    pub period_from: Option<String>,
    pub period_to: Option<String>,
    pub days_of_operation: Option<String>,
    pub seats: Option<String>,
    pub aircraft_type: Option<String>,
    pub origin_station: Option<String>,
    pub previous_station: Option<String>,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub overnight_indicator: Option<String>,
    pub next_station: Option<String>,
    pub destination_station: Option<String>,
    pub arrival_service_type: Option<String>,
    pub departure_service_type: Option<String>,
    pub frequency_rate: Option<String>,
    pub additional_schedule_information: Option<String>,
    pub raw: RawLine,
}

impl CombinedRecord {
    pub fn from_fields(mut f: FieldMap, raw: RawLine) -> Self {
        Self {
            action_code: f.take("action_code"),
            arrival: FlightDesignator::take(&mut f, "arrival"),
            departure: FlightDesignator::take(&mut f, "departure"),
            period_from: f.take("period_of_operation_from"),
            period_to: f.take("period_of_operation_to"),
            days_of_operation: f.take("days_of_operation"),
            seats: f.take("seats"),
            aircraft_type: f.take("aircraft_type"),
            origin_station: f.take("origin_station"),
            previous_station: f.take("previous_station"),
            arrival_time: f.take("scheduled_time_of_arrival_utc"),
            departure_time: f.take("scheduled_time_of_departure_utc"),
            overnight_indicator: f.take("overnight_indicator"),
            next_station: f.take("next_station"),
            destination_station: f.take("destination_station"),
            arrival_service_type: f.take("arrival_service_type"),
            departure_service_type: f.take("departure_service_type"),
            frequency_rate: f.take("frequency_rate"),
            additional_schedule_information: f.take("additional_schedule_information"),
            raw,
        }
    }
}

/// SIR line carrying only an arrival
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalRecord {
    pub action_code: Option<String>,
    pub arrival: FlightDesignator,
    pub period_from: Option<String>,
    pub period_to: Option<String>,
    pub days_of_operation: Option<String>,
    pub seats: Option<String>,
    pub aircraft_type: Option<String>,
    pub origin_station: Option<String>,
    pub previous_station: Option<String>,
    pub arrival_time: Option<String>,
    pub service_type: Option<String>,
    pub frequency_rate: Option<String>,
    pub additional_schedule_information: Option<String>,
    pub raw: RawLine,
}

impl ArrivalRecord {
    pub fn from_fields(mut f: FieldMap, raw: RawLine) -> Self {
        Self {
            action_code: f.take("action_code"),
            arrival: FlightDesignator::take(&mut f, "arrival"),
            period_from: f.take("period_of_operation_from"),
            period_to: f.take("period_of_operation_to"),
            days_of_operation: f.take("days_of_operation"),
            seats: f.take("seats"),
            aircraft_type: f.take("aircraft_type"),
            origin_station: f.take("origin_station"),
            previous_station: f.take("previous_station"),
            arrival_time: f.take("scheduled_time_of_arrival_utc"),
            service_type: f.take("arrival_service_type"),
            frequency_rate: f.take("frequency_rate"),
            additional_schedule_information: f.take("additional_schedule_information"),
            raw,
        }
    }
}

/// SIR line carrying only a departure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRecord {
    pub action_code: Option<String>,
    pub departure: FlightDesignator,
    pub period_from: Option<String>,
    pub period_to: Option<String>,
    pub days_of_operation: Option<String>,
    pub seats: Option<String>,
    pub aircraft_type: Option<String>,
    pub departure_time: Option<String>,
    pub next_station: Option<String>,
    pub destination_station: Option<String>,
    pub service_type: Option<String>,
    pub frequency_rate: Option<String>,
    pub additional_schedule_information: Option<String>,
    pub raw: RawLine,
}

impl DepartureRecord {
    pub fn from_fields(mut f: FieldMap, raw: RawLine) -> Self {
        Self {
            action_code: f.take("action_code"),
            departure: FlightDesignator::take(&mut f, "departure"),
            period_from: f.take("period_of_operation_from"),
            period_to: f.take("period_of_operation_to"),
            days_of_operation: f.take("days_of_operation"),
            seats: f.take("seats"),
            aircraft_type: f.take("aircraft_type"),
            departure_time: f.take("scheduled_time_of_departure_utc"),
            next_station: f.take("next_station"),
            destination_station: f.take("destination_station"),
            service_type: f.take("departure_service_type"),
            frequency_rate: f.take("frequency_rate"),
            additional_schedule_information: f.take("additional_schedule_information"),
            raw,
        }
    }
}

/// SIM flight leg record (type 3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightLegRecord {
    pub designator: FlightDesignator,
    pub itinerary_variation_identifier: Option<String>,
    pub leg_sequence_number: Option<String>,
    pub service_type: Option<String>,
    pub period_from: Option<String>,
    pub period_to: Option<String>,
    pub days_of_operation: Option<String>,
    pub frequency_rate: Option<String>,
    pub departure_station: Option<String>,
    pub passenger_departure_time: Option<String>,
    pub aircraft_departure_time: Option<String>,
    pub departure_utc_variation: Option<String>,
    pub departure_terminal: Option<String>,
    pub arrival_station: Option<String>,
    pub aircraft_arrival_time: Option<String>,
    pub passenger_arrival_time: Option<String>,
    pub arrival_utc_variation: Option<String>,
    pub arrival_terminal: Option<String>,
    pub aircraft_type: Option<String>,
    pub booking_designators: Option<String>,
    pub aircraft_configuration_version: Option<String>,
    pub date_variation: Option<String>,
    pub record_serial_number: Option<String>,
    pub raw: RawLine,
}

impl FlightLegRecord {
    pub fn from_fields(mut f: FieldMap, raw: RawLine) -> Self {
        Self {
            designator: FlightDesignator {
                airline_designator: f.take("airline_designator"),
                flight_number: f.take("flight_number"),
                operational_suffix: f.take("operational_suffix"),
            },
            itinerary_variation_identifier: f.take("itinerary_variation_identifier"),
            leg_sequence_number: f.take("leg_sequence_number"),
            service_type: f.take("service_type"),
            period_from: f.take("period_of_operation_from"),
            period_to: f.take("period_of_operation_to"),
            days_of_operation: f.take("days_of_operation"),
            frequency_rate: f.take("frequency_rate"),
            departure_station: f.take("departure_station"),
            passenger_departure_time: f.take("scheduled_time_of_passenger_departure"),
            aircraft_departure_time: f.take("scheduled_time_of_aircraft_departure"),
            departure_utc_variation: f.take("utc_local_time_variation_departure"),
            departure_terminal: f.take("passenger_terminal_departure"),
            arrival_station: f.take("arrival_station"),
            aircraft_arrival_time: f.take("scheduled_time_of_aircraft_arrival"),
            passenger_arrival_time: f.take("scheduled_time_of_passenger_arrival"),
            arrival_utc_variation: f.take("utc_local_time_variation_arrival"),
            arrival_terminal: f.take("passenger_terminal_arrival"),
            aircraft_type: f.take("aircraft_type"),
            booking_designators: f.take("passenger_reservations_booking_designator"),
            aircraft_configuration_version: f.take("aircraft_configuration_version"),
            date_variation: f.take("date_variation"),
            record_serial_number: f.take("record_serial_number"),
            raw,
        }
    }
}

/// SIM segment data record (type 4)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDataRecord {
    pub designator: FlightDesignator,
    pub itinerary_variation_identifier: Option<String>,
    pub leg_sequence_number: Option<String>,
    pub board_point: Option<String>,
    pub off_point: Option<String>,
    pub data_element_identifier: Option<String>,
    pub data: Option<String>,
    pub raw: RawLine,
}

impl SegmentDataRecord {
    pub fn from_fields(mut f: FieldMap, raw: RawLine) -> Self {
        Self {
            designator: FlightDesignator {
                airline_designator: f.take("airline_designator"),
                flight_number: f.take("flight_number"),
                operational_suffix: f.take("operational_suffix"),
            },
            itinerary_variation_identifier: f.take("itinerary_variation_identifier"),
            leg_sequence_number: f.take("leg_sequence_number"),
            board_point: f.take("board_point_indicator"),
            off_point: f.take("off_point_indicator"),
            data_element_identifier: f.take("data_element_identifier"),
            data: f.take("data"),
            raw,
        }
    }
}

/// One row of the semicolon-separated export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub action_code: Option<String>,
    pub airport: Option<String>,
    pub designator: FlightDesignator,
    pub direction: Option<String>,
    pub scheduled_time: Option<String>,
    pub period_from: Option<String>,
    pub period_to: Option<String>,
    pub days_of_operation: Option<String>,
    /// Previous or next stations, `/`-separated
    pub stations: Option<String>,
    pub aircraft_type: Option<String>,
    pub service_type: Option<String>,
    pub frequency_rate: Option<String>,
    pub season: Option<String>,
    pub remarks: Option<String>,
    pub seats: Option<String>,
    /// Original schedule line carried in the last column
    pub source_raw: Option<String>,
    pub raw: RawLine,
}

/// Tagged union of every record shape a body line can produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRecord {
    Combined(CombinedRecord),
    ArrivalOnly(ArrivalRecord),
    DepartureOnly(DepartureRecord),
    FlightLeg(FlightLegRecord),
    SegmentData(SegmentDataRecord),
    Csv(CsvRecord),
    /// Line no grammar matched
    Unparsed(RawLine),
}

impl ParsedRecord {
    pub fn raw(&self) -> &RawLine {
        match self {
            ParsedRecord::Combined(r) => &r.raw,
            ParsedRecord::ArrivalOnly(r) => &r.raw,
            ParsedRecord::DepartureOnly(r) => &r.raw,
            ParsedRecord::FlightLeg(r) => &r.raw,
            ParsedRecord::SegmentData(r) => &r.raw,
            ParsedRecord::Csv(r) => &r.raw,
            ParsedRecord::Unparsed(raw) => raw,
        }
    }

    pub fn action_code(&self) -> Option<&str> {
        match self {
            ParsedRecord::Combined(r) => r.action_code.as_deref(),
            ParsedRecord::ArrivalOnly(r) => r.action_code.as_deref(),
            ParsedRecord::DepartureOnly(r) => r.action_code.as_deref(),
            ParsedRecord::Csv(r) => r.action_code.as_deref(),
            ParsedRecord::FlightLeg(_) | ParsedRecord::SegmentData(_) | ParsedRecord::Unparsed(_) => {
                None
            }
        }
    }

    /// Short name of the record shape
    pub fn shape_name(&self) -> &'static str {
        match self {
            ParsedRecord::Combined(_) => "combined",
            ParsedRecord::ArrivalOnly(_) => "arrival",
            ParsedRecord::DepartureOnly(_) => "departure",
            ParsedRecord::FlightLeg(_) => "flight_leg",
            ParsedRecord::SegmentData(_) => "segment_data",
            ParsedRecord::Csv(_) => "csv",
            ParsedRecord::Unparsed(_) => "unparsed",
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, ParsedRecord::Unparsed(_))
    }
}
