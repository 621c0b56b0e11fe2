//! Fixtures shared by the schedule reader tests
//!
//! SIM records are assembled from the grammar layouts so every fixture has
//! the exact column widths the reader expects.

use std::io::Write;
use tempfile::NamedTempFile;

use crate::app::services::grammar::{
    SIM_CARRIER_LAYOUT, SIM_FLIGHT_LEG_LAYOUT, SIM_HEADER_LAYOUT, SIM_SEGMENT_DATA_LAYOUT,
    SIM_TRAILER_LAYOUT,
};
use crate::constants::{CSV_COLUMN_COUNT, SIM_RECORD_WIDTH, SIM_TITLE};

mod detector_tests;
mod header_tests;
mod stats_tests;

/// SIR clearance message for LHR, winter 2017
///
/// Body lines 6 to 10: a combined row, an arrival row with a remark on the
/// following line, a departure row and one line no grammar matches.
pub fn create_test_sir() -> String {
    [
        "SCR",
        "/AB1234",
        "W17",
        "18OCT",
        "LHR",
        "NBA123 BA124 29OCT05NOV 0000007 180320 AMS1200 1300CDG JJ",
        "NBA125 29OCT05NOV 0000007 180320 AMS1400 J",
        "/ LATE ARRIVAL /",
        "N BA126 29OCT05NOV 0000007 180320 1500CDG J",
        "XXXX GARBAGE",
        "SI TEST MESSAGE",
        "GI BRGDS",
        "   SLOT DESK",
    ]
    .join("\n")
}

/// Fixed-width record built from a layout, unset fields left blank
pub fn sim_record(record_type: char, layout: &[(&str, usize)], values: &[(&str, &str)]) -> String {
    let mut record = String::with_capacity(SIM_RECORD_WIDTH);
    record.push(record_type);
    for (name, width) in layout {
        let value = values
            .iter()
            .find(|(field, _)| field == name)
            .map_or("", |(_, value)| *value);
        record.push_str(&format!("{:<width$.width$}", value, width = *width));
    }
    record
}

pub fn sim_leg(flight_number: &str, departure: &str, std: &str, arrival: &str, sta: &str) -> String {
    sim_record(
        '3',
        SIM_FLIGHT_LEG_LAYOUT,
        &[
            ("airline_designator", "KL"),
            ("flight_number", flight_number),
            ("itinerary_variation_identifier", "01"),
            ("leg_sequence_number", "01"),
            ("service_type", "J"),
            ("period_of_operation_from", "29OCT17"),
            ("period_of_operation_to", "04NOV17"),
            ("days_of_operation", "1234567"),
            ("departure_station", departure),
            ("scheduled_time_of_passenger_departure", std),
            ("scheduled_time_of_aircraft_departure", std),
            ("utc_local_time_variation_departure", "+0100"),
            ("arrival_station", arrival),
            ("scheduled_time_of_aircraft_arrival", sta),
            ("scheduled_time_of_passenger_arrival", sta),
            ("utc_local_time_variation_arrival", "-0500"),
            ("aircraft_type", "333"),
            ("aircraft_configuration_version", "C30M262VV333"),
            ("record_serial_number", "000003"),
        ],
    )
}

/// SIM data set for KL with one AMS-JFK leg, its segment data and a trailer
pub fn create_test_sim() -> String {
    [
        sim_record(
            '1',
            SIM_HEADER_LAYOUT,
            &[
                ("title_of_contents", SIM_TITLE),
                ("number_of_seasons", "1"),
                ("data_set_serial_number", "001"),
                ("record_serial_number", "000001"),
            ],
        ),
        "0".repeat(SIM_RECORD_WIDTH),
        sim_record(
            '2',
            SIM_CARRIER_LAYOUT,
            &[
                ("time_mode", "L"),
                ("airline_designator", "KL"),
                ("season", "W17"),
                ("period_of_schedule_validity_from", "29OCT17"),
                ("period_of_schedule_validity_to", "24MAR18"),
                ("creation_date", "18OCT17"),
                ("creator_reference", "SCHEDULING"),
                ("record_serial_number", "000002"),
            ],
        ),
        sim_leg("0641", "AMS", "2200", "JFK", "0030"),
        sim_record(
            '4',
            SIM_SEGMENT_DATA_LAYOUT,
            &[
                ("airline_designator", "KL"),
                ("flight_number", "0641"),
                ("data_element_identifier", "010"),
                ("board_point", "AMS"),
                ("off_point", "JFK"),
                ("data", "AF 1234"),
                ("record_serial_number", "000004"),
            ],
        ),
        sim_record(
            '5',
            SIM_TRAILER_LAYOUT,
            &[
                ("airline_designator", "KL"),
                ("serial_number_check_reference", "000004"),
                ("continuation_end_code", "E"),
                ("record_serial_number", "000005"),
            ],
        ),
    ]
    .join("\n")
}

/// Semicolon-separated row from at most twenty leading cells
pub fn csv_row(cells: &[&str]) -> String {
    let mut row: Vec<&str> = cells.to_vec();
    row.resize(CSV_COLUMN_COUNT, "");
    row.join(";")
}

pub fn csv_header_row() -> String {
    csv_row(&[
        "action_code",
        "airport",
        "airline_designator",
        "flight_number",
        "operational_suffix",
        "direction",
        "scheduled_time",
        "period_of_operation_from",
        "period_of_operation_to",
        "days_of_operation",
        "stations",
        "aircraft_type",
        "service_type",
        "frequency_rate",
        "spare_0",
        "spare_1",
        "season",
        "remarks",
        "seats",
        "raw",
    ])
}

/// CSV export with a header, two valid rows and one short row
pub fn create_test_csv() -> String {
    [
        csv_header_row(),
        csv_row(&[
            "N", "AMS", "KL", "1001", "", "D", "0715", "20171029", "20171104", "1234567",
            "LHR/JFK", "73H", "J", "", "", "", "W17", "", "186", "N KL1001 29OCT04NOV",
        ]),
        csv_row(&[
            "N", "AMS", "KL", "1002", "", "A", "2400", "20171029", "00XXX00", "0000007",
            "LHR", "73H", "J", "", "", "", "W17", "LATE", "186",
        ]),
        "N;AMS;KL;1003".to_string(),
    ]
    .join("\n")
}

/// Write content to a named temporary file
pub fn create_temp_file(content: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}
