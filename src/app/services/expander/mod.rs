//! Recurrence expansion of slots into flights
//!
//! [`expansion`] turns each canonical slot into one flight per operating
//! date. [`compression`] regroups flights into slots and is used to check
//! expansions against their source.

pub mod compression;
pub mod expansion;

pub use compression::compress_flights;
pub use expansion::{expand_slot, occurrence_dates};

use crate::Result;
use crate::app::models::{Diagnostic, DiagnosticKind, Flight, Season, Slot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Counts and diagnostics of one expansion run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionStats {
    /// Slots expanded without error
    pub slots_expanded: usize,

    pub flights_generated: usize,

    /// Expanded slots whose window held no operating day
    pub empty_slots: usize,

    pub diagnostics: Vec<Diagnostic>,
}

impl ExpansionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Percentage of expanded slots that produced at least one flight
    pub fn success_rate(&self) -> f64 {
        if self.slots_expanded == 0 {
            0.0
        } else {
            ((self.slots_expanded - self.empty_slots) as f64 / self.slots_expanded as f64) * 100.0
        }
    }

    pub fn log_summary(&self) {
        info!(
            "Expanded {} slots into {} flights",
            self.slots_expanded, self.flights_generated
        );
        if self.empty_slots > 0 {
            warn!(
                "{} of {} slots produced zero flights",
                self.empty_slots, self.slots_expanded
            );
        }
    }
}

/// Flights of a batch of slots with the statistics of the run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Expansion {
    pub flights: Vec<Flight>,
    pub stats: ExpansionStats,
}

/// Expand every slot, isolating record-level failures
///
/// A slot that cannot be expanded, for example an open season bound with
/// no season to resolve it, is skipped with a diagnostic. Flights keep the
/// order of their slots and are date ordered within each slot.
pub fn expand_slots(slots: &[Slot], season: Option<&Season>, year_prefix: &str) -> Result<Expansion> {
    let mut expansion = Expansion::default();

    for slot in slots {
        match expand_slot(slot, season, year_prefix) {
            Ok(flights) => {
                expansion.stats.slots_expanded += 1;
                if flights.is_empty() {
                    expansion.stats.empty_slots += 1;
                    expansion.stats.push(
                        Diagnostic::new(
                            DiagnosticKind::EmptyExpansion,
                            format!("{} has no operating day in its window", slot.designator()),
                        )
                        .at_line(slot.line_number)
                        .with_raw(slot.raw.as_str()),
                    );
                }
                debug!("{} expanded into {} flights", slot.designator(), flights.len());
                expansion.stats.flights_generated += flights.len();
                expansion.flights.extend(flights);
            }
            Err(e) if e.is_record_level() => {
                expansion
                    .stats
                    .push(Diagnostic::from_error(&e, slot.line_number, &slot.raw));
            }
            Err(e) => return Err(e),
        }
    }

    expansion.stats.log_summary();
    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{
        AircraftConfiguration, DaysOfOperation, Direction, OperatingPeriod, PeriodBound,
        SourceFormat,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slot(period: OperatingPeriod, days: &str) -> Slot {
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
            period,
            days_of_operation: DaysOfOperation::from_ssim(days),
            frequency_rate: 1,
            scheduled_time: None,
            day_offset: 0,
            aircraft_configuration: AircraftConfiguration::default(),
            additional_schedule_information: None,
            season: None,
            raw: "raw".to_string(),
            line_number: 6,
        }
    }

    #[test]
    fn test_batch_isolates_missing_season() {
        let open = OperatingPeriod {
            from: PeriodBound::Date(date(2017, 10, 29)),
            to: PeriodBound::OpenSeason,
        };
        let slots = vec![
            slot(open, "1234567"),
            slot(OperatingPeriod::new(date(2017, 10, 29), date(2017, 11, 4)), "1234567"),
        ];

        let expansion = expand_slots(&slots, None, "20").unwrap();
        assert_eq!(expansion.flights.len(), 7);
        assert_eq!(expansion.stats.slots_expanded, 1);
        assert_eq!(expansion.stats.diagnostics.len(), 1);
        assert_eq!(
            expansion.stats.diagnostics[0].kind,
            DiagnosticKind::MissingSeasonContext
        );
    }

    #[test]
    fn test_season_resolves_open_bounds() {
        let open = OperatingPeriod {
            from: PeriodBound::OpenSeason,
            to: PeriodBound::OpenSeason,
        };
        let season: Season = "W17".parse().unwrap();
        let expansion = expand_slots(&[slot(open, "0000007")], Some(&season), "20").unwrap();

        let flights = &expansion.flights;
        assert_eq!(flights.first().map(|f| f.flight_date), Some(date(2017, 10, 29)));
        assert_eq!(flights.last().map(|f| f.flight_date), Some(date(2018, 3, 25)));
        assert_eq!(flights.len(), 22);
    }

    #[test]
    fn test_empty_expansion_is_reported() {
        // 30 Oct 2017 is a Monday
        let slots = vec![slot(
            OperatingPeriod::new(date(2017, 10, 30), date(2017, 10, 30)),
            "0000007",
        )];
        let expansion = expand_slots(&slots, None, "20").unwrap();

        assert!(expansion.flights.is_empty());
        assert_eq!(expansion.stats.empty_slots, 1);
        assert_eq!(expansion.stats.success_rate(), 0.0);
        assert_eq!(
            expansion.stats.diagnostics[0].kind,
            DiagnosticKind::EmptyExpansion
        );
    }
}
