//! End-to-end tests for reading and expanding schedule files
//!
//! Each test writes a synthetic SIR, SIM or CSV file to disk, reads it through
//! the public entry points and checks the expanded flights.

use chrono::{NaiveDate, NaiveDateTime};
use ssim_processor::app::services::grammar::{
    SIM_CARRIER_LAYOUT, SIM_FLIGHT_LEG_LAYOUT, SIM_HEADER_LAYOUT, SIM_TRAILER_LAYOUT,
};
use ssim_processor::constants::SIM_TITLE;
use ssim_processor::{
    Direction, Error, SourceFormat, compress_flights, expand_slots,
    explode_aircraft_configuration, find_season_dates, read,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn datetime(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
}

fn sim_record(record_type: char, layout: &[(&str, usize)], values: &[(&str, &str)]) -> String {
    let mut record = String::new();
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

fn sim_data_set() -> String {
    [
        sim_record(
            '1',
            SIM_HEADER_LAYOUT,
            &[
                ("title_of_contents", SIM_TITLE),
                ("record_serial_number", "000001"),
            ],
        ),
        sim_record(
            '2',
            SIM_CARRIER_LAYOUT,
            &[
                ("time_mode", "L"),
                ("airline_designator", "KL"),
                ("season", "W17"),
                ("period_of_schedule_validity_from", "29OCT17"),
                ("period_of_schedule_validity_to", "24MAR18"),
                ("record_serial_number", "000002"),
            ],
        ),
        sim_record(
            '3',
            SIM_FLIGHT_LEG_LAYOUT,
            &[
                ("airline_designator", "KL"),
                ("flight_number", "0641"),
                ("itinerary_variation_identifier", "01"),
                ("leg_sequence_number", "01"),
                ("service_type", "J"),
                ("period_of_operation_from", "29OCT17"),
                ("period_of_operation_to", "04NOV17"),
                ("days_of_operation", "1234567"),
                ("departure_station", "AMS"),
                ("scheduled_time_of_passenger_departure", "2200"),
                ("scheduled_time_of_aircraft_departure", "2200"),
                ("utc_local_time_variation_departure", "+0100"),
                ("arrival_station", "JFK"),
                ("scheduled_time_of_aircraft_arrival", "0030"),
                ("scheduled_time_of_passenger_arrival", "0030"),
                ("utc_local_time_variation_arrival", "-0500"),
                ("aircraft_type", "333"),
                ("aircraft_configuration_version", "C30M262VV333"),
                ("record_serial_number", "000003"),
            ],
        ),
        sim_record(
            '5',
            SIM_TRAILER_LAYOUT,
            &[
                ("airline_designator", "KL"),
                ("serial_number_check_reference", "000003"),
                ("continuation_end_code", "E"),
                ("record_serial_number", "000004"),
            ],
        ),
    ]
    .join("\n")
}

#[test]
fn test_sir_combined_row_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "W17_LHR.sir",
        "SCR\r\n/AB1234\r\nW17\r\n18OCT\r\nLHR\r\n\
         NBA123 BA124 29OCT05NOV 0000007 180320 AMS1200 1300CDG JJ\r\n\
         SI SLOT DESK\r\n",
    );

    let slot_file = read(&path, None, None).unwrap();
    assert_eq!(slot_file.format, SourceFormat::Sir);
    assert_eq!(slot_file.slots.len(), 2);

    let expansion = expand_slots(&slot_file.slots, slot_file.header.season.as_ref()).unwrap();
    assert_eq!(expansion.flights.len(), 4);
    assert_eq!(expansion.stats.slots_expanded, 2);
    assert!(expansion.stats.diagnostics.is_empty());

    let arrivals: Vec<_> = expansion
        .flights
        .iter()
        .filter(|f| f.direction == Direction::Arrival)
        .collect();
    assert_eq!(arrivals.len(), 2);
    assert_eq!(arrivals[0].flight_date, date(2017, 10, 29));
    assert_eq!(arrivals[1].flight_date, date(2017, 11, 5));
    assert_eq!(
        arrivals[0].flight_datetime_utc,
        Some(datetime("2017-10-29 12:00"))
    );
    assert_eq!(arrivals[0].station.as_deref(), Some("AMS"));

    // Expanding and compressing gives back the slots that were read
    assert_eq!(compress_flights(&expansion.flights), slot_file.slots);
}

#[test]
fn test_minimal_sir_one_week_window() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "minimal.sir",
        "SCR\n/AB1234\nW17\n18OCT\nLHR\n\
         NBA123 BA124 30OCT05NOV 0030000 180320 AMS1200 1300CDG JJ\n",
    );

    let slot_file = read(&path, None, None).unwrap();
    assert_eq!(slot_file.slots.len(), 2);

    let expansion = expand_slots(&slot_file.slots, slot_file.header.season.as_ref()).unwrap();
    assert_eq!(expansion.flights.len(), 2);
    // The only Wednesday between Monday 30 Oct and Sunday 5 Nov
    assert!(
        expansion
            .flights
            .iter()
            .all(|f| f.flight_date == date(2017, 11, 1))
    );
}

#[test]
fn test_sim_leg_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "KL_W17.ssim", &sim_data_set());

    let slot_file = read(&path, None, None).unwrap();
    assert_eq!(slot_file.format, SourceFormat::Sim);
    assert_eq!(slot_file.slots.len(), 2);

    let expansion = expand_slots(&slot_file.slots, None).unwrap();
    assert_eq!(expansion.flights.len(), 14);

    let first_departure = expansion
        .flights
        .iter()
        .find(|f| f.direction == Direction::Departure)
        .unwrap();
    assert_eq!(first_departure.airport.as_deref(), Some("AMS"));
    assert_eq!(
        first_departure.flight_datetime_local,
        Some(datetime("2017-10-29 22:00"))
    );
    assert_eq!(
        first_departure.flight_datetime_utc,
        Some(datetime("2017-10-29 21:00"))
    );
    assert_eq!(first_departure.aircraft_configuration.seats, Some(292));

    // The arrival lands the day after the operating day
    let first_arrival = expansion
        .flights
        .iter()
        .find(|f| f.direction == Direction::Arrival)
        .unwrap();
    assert_eq!(first_arrival.operating_date(), date(2017, 10, 29));
    assert_eq!(first_arrival.flight_date, date(2017, 10, 30));
    assert_eq!(
        first_arrival.flight_datetime_utc,
        Some(datetime("2017-10-30 05:30"))
    );

    assert_eq!(compress_flights(&expansion.flights), slot_file.slots);
}

#[test]
fn test_sim_airport_filter_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "KL_W17.ssim", &sim_data_set());

    let slot_file = read(&path, Some("JFK"), None).unwrap();
    assert_eq!(slot_file.slots.len(), 1);
    assert_eq!(slot_file.slots[0].direction, Direction::Arrival);

    let expansion = expand_slots(&slot_file.slots, None).unwrap();
    assert_eq!(expansion.flights.len(), 7);
}

#[test]
fn test_csv_open_bound_end_to_end() {
    let mut cells = vec![
        "N", "AMS", "KL", "1002", "", "A", "0830", "20171029", "00XXX00", "0000007", "LHR",
        "73H", "J", "", "", "", "W17", "", "186",
    ];
    cells.push("");
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "export.csv", &cells.join(";"));

    let slot_file = read(&path, None, None).unwrap();
    assert_eq!(slot_file.format, SourceFormat::Csv);
    assert_eq!(slot_file.slots.len(), 1);

    let expansion = expand_slots(&slot_file.slots, None).unwrap();
    let (_, season_end) = find_season_dates("W17", "20").unwrap();
    let last = expansion.flights.last().unwrap();
    assert!(last.flight_date <= season_end);
    assert_eq!(expansion.flights.first().unwrap().flight_date, date(2017, 10, 29));
    assert!(expansion.flights.iter().all(|f| f.flight_date.format("%a").to_string() == "Sun"));
}

#[test]
fn test_unrecognized_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "not a schedule\n");
    assert!(matches!(
        read(&path, None, None),
        Err(Error::UnrecognizedFormat { .. })
    ));
}

#[test]
fn test_public_helpers() {
    let (start, end) = find_season_dates("W17", "20").unwrap();
    assert!(start < end);
    assert_eq!(start, date(2017, 10, 29));

    let configuration = explode_aircraft_configuration(Some("C30M262VV333"));
    assert_eq!(configuration.seats, Some(292));
    assert_eq!(configuration.version.as_deref(), Some("333"));
}
