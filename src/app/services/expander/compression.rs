//! Regrouping flights into slots
//!
//! Flights that differ only by date and timestamps belong to one slot. The
//! slot's weekday mask is the set of weekdays the flights operate on and its
//! window runs from the first to the last operating date. Windows of slots
//! with a frequency rate above one, or whose bounds were not operating days,
//! are not recovered exactly.

use crate::app::models::{DaysOfOperation, Flight, OperatingPeriod, PeriodBound, Slot};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Slot of a flight with its period and mask left empty
fn template(flight: &Flight) -> Slot {
    Slot {
        direction: flight.direction,
        source_format: flight.source_format,
        action_code: flight.action_code.clone(),
        airline_designator: flight.airline_designator.clone(),
        flight_number: flight.flight_number.clone(),
        operational_suffix: flight.operational_suffix.clone(),
        service_type: flight.service_type.clone(),
        aircraft_type: flight.aircraft_type.clone(),
        airport: flight.airport.clone(),
        station: flight.station.clone(),
        second_station: flight.second_station.clone(),
        period: OperatingPeriod {
            from: PeriodBound::OpenSeason,
            to: PeriodBound::OpenSeason,
        },
        days_of_operation: DaysOfOperation::empty(),
        frequency_rate: flight.frequency_rate,
        scheduled_time: flight.scheduled_time,
        day_offset: flight.day_offset,
        aircraft_configuration: flight.aircraft_configuration.clone(),
        additional_schedule_information: flight.additional_schedule_information.clone(),
        season: flight.season,
        raw: flight.raw.clone(),
        line_number: flight.line_number,
    }
}

/// Group flights back into slots, in order of first appearance
pub fn compress_flights(flights: &[Flight]) -> Vec<Slot> {
    let mut index: HashMap<Slot, usize> = HashMap::new();
    let mut groups: Vec<(Slot, Vec<NaiveDate>)> = Vec::new();

    for flight in flights {
        let key = template(flight);
        let position = match index.get(&key) {
            Some(position) => *position,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, Vec::new()));
                groups.len() - 1
            }
        };
        groups[position].1.push(flight.operating_date());
    }

    groups
        .into_iter()
        .filter_map(|(mut slot, dates)| {
            let from = dates.iter().min().copied()?;
            let to = dates.iter().max().copied()?;
            slot.period = OperatingPeriod::new(from, to);
            slot.days_of_operation = DaysOfOperation::from_weekdays(dates.iter().map(|d| d.weekday()));
            Some(slot)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{AircraftConfiguration, Direction, SourceFormat};
    use crate::app::services::expander::expand_slot;
    use chrono::Duration;
    use proptest::prelude::*;

    fn slot(from: NaiveDate, to: NaiveDate, days: DaysOfOperation, frequency_rate: u32) -> Slot {
        Slot {
            direction: Direction::Arrival,
            source_format: SourceFormat::Sir,
            action_code: Some("N".to_string()),
            airline_designator: Some("BA".to_string()),
            flight_number: Some("123".to_string()),
            operational_suffix: None,
            service_type: Some("J".to_string()),
            aircraft_type: Some("320".to_string()),
            airport: Some("LHR".to_string()),
            station: Some("AMS".to_string()),
            second_station: None,
            period: OperatingPeriod::new(from, to),
            days_of_operation: days,
            frequency_rate,
            scheduled_time: None,
            day_offset: 0,
            aircraft_configuration: AircraftConfiguration::default(),
            additional_schedule_information: None,
            season: None,
            raw: "NBA123".to_string(),
            line_number: 6,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_groups_by_slot_attributes() {
        let first = slot(date(2017, 10, 29), date(2017, 11, 5), DaysOfOperation::from_ssim("0000007"), 1);
        let mut second = first.clone();
        second.flight_number = Some("125".to_string());
        second.days_of_operation = DaysOfOperation::from_ssim("1000000");

        let mut flights = expand_slot(&first, None, "20").unwrap();
        flights.extend(expand_slot(&second, None, "20").unwrap());
        flights.reverse();

        let slots = compress_flights(&flights);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].flight_number.as_deref(), Some("125"));
        assert_eq!(slots[0].period, OperatingPeriod::new(date(2017, 10, 30), date(2017, 10, 30)));
        assert_eq!(slots[1], first);
    }

    #[test]
    fn test_overnight_flights_keep_operating_dates() {
        let mut overnight = slot(date(2017, 10, 29), date(2017, 11, 5), DaysOfOperation::from_ssim("0000007"), 1);
        overnight.day_offset = 1;

        let flights = expand_slot(&overnight, None, "20").unwrap();
        assert_eq!(flights[0].flight_date.weekday(), chrono::Weekday::Mon);
        assert_eq!(compress_flights(&flights), vec![overnight]);
    }

    #[test]
    fn test_empty_input() {
        assert!(compress_flights(&[]).is_empty());
    }

    #[test]
    fn test_frequency_above_one_is_best_effort() {
        // Every other Sunday: the last Sunday of the window is skipped
        let original = slot(date(2017, 10, 29), date(2017, 11, 12), DaysOfOperation::from_ssim("0000007"), 2);
        let flights = expand_slot(&original, None, "20").unwrap();
        let slots = compress_flights(&flights);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].days_of_operation, original.days_of_operation);
        assert_eq!(slots[0].frequency_rate, 2);
        assert_eq!(slots[0].period, original.period);

        let shortened = slot(date(2017, 10, 29), date(2017, 11, 18), DaysOfOperation::from_ssim("0000007"), 2);
        let slots = compress_flights(&expand_slot(&shortened, None, "20").unwrap());
        assert_ne!(slots[0].period, shortened.period);
    }

    proptest! {
        #[test]
        fn prop_expand_then_compress_recovers_slot(
            start in 0i64..730,
            // At least a week, so every masked weekday occurs
            span in 6i64..210,
            mask in 0u8..128,
        ) {
            let from = date(2017, 1, 1) + Duration::days(start);
            let to = from + Duration::days(span);

            let mut days = DaysOfOperation::from_weekdays(
                (0..7u8)
                    .filter(|bit| mask & (1 << bit) != 0)
                    .filter_map(|bit| chrono::Weekday::try_from(bit).ok()),
            );
            days.insert(from.weekday());
            days.insert(to.weekday());

            let original = slot(from, to, days, 1);
            let flights = expand_slot(&original, None, "20").unwrap();
            let compressed = compress_flights(&flights);

            prop_assert_eq!(compressed.len(), 1);
            prop_assert_eq!(compressed[0].days_of_operation, days);
            prop_assert_eq!(compressed[0].period, original.period);
        }
    }
}
