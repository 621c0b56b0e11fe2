//! Aircraft configuration decoder
//!
//! Configuration strings such as `J12Y138`, `C30M150VVA320` or a bare seat
//! count are split into per-class seats, cargo positions and the aircraft
//! version.

use crate::app::models::AircraftConfiguration;
use crate::constants::{CARGO_DESIGNATORS, CONFIGURATION_VERSION_SEPARATOR, SEAT_CLASS_DESIGNATORS};
use tracing::warn;

/// Designator with its count digits, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigurationToken {
    designator: String,
    digits: String,
}

impl ConfigurationToken {
    /// No digits count as zero; `None` when the digits overflow `u32`
    fn count(&self) -> Option<u32> {
        if self.digits.is_empty() {
            Some(0)
        } else {
            self.digits.parse().ok()
        }
    }
}

/// Split a layout into designator/count pairs
///
/// Leading digits get an empty designator.
fn tokenize(layout: &str) -> Vec<ConfigurationToken> {
    let mut tokens = Vec::new();
    let mut chars = layout.chars().filter(|c| !c.is_whitespace()).peekable();

    while chars.peek().is_some() {
        let mut designator = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_ascii_digit()) {
            designator.push(c.to_ascii_uppercase());
        }
        let mut digits = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
            digits.push(c);
        }
        tokens.push(ConfigurationToken { designator, digits });
    }
    tokens
}

fn accumulate(total: &mut u32, count: u32) {
    *total = total.saturating_add(count);
}

fn is_seat_class(designator: &str) -> bool {
    let mut chars = designator.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if SEAT_CLASS_DESIGNATORS.contains(&c))
}

/// Decode an aircraft configuration string
///
/// Absent or blank input yields an empty configuration. Designators outside
/// the class and cargo alphabets are kept under `unknown` and logged, as are
/// counts too large to hold. Seat totals saturate instead of overflowing.
pub fn explode_aircraft_configuration(input: Option<&str>) -> AircraftConfiguration {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return AircraftConfiguration::default();
    };

    let (layout, version) = match raw.find(CONFIGURATION_VERSION_SEPARATOR) {
        Some(index) => {
            let version = raw[index + CONFIGURATION_VERSION_SEPARATOR.len()..].trim();
            (&raw[..index], (!version.is_empty()).then(|| version.to_string()))
        }
        None => (raw, None),
    };

    let mut configuration = AircraftConfiguration {
        raw: Some(raw.to_string()),
        version,
        ..Default::default()
    };
    let mut seats: Option<u32> = None;

    for token in tokenize(layout) {
        let Some(count) = token.count() else {
            warn!(
                "Aircraft configuration count '{}{}' out of range in '{}'",
                token.designator, token.digits, raw
            );
            configuration
                .unknown
                .entry(format!("{}{}", token.designator, token.digits))
                .or_insert(0);
            continue;
        };

        if token.designator.is_empty() {
            accumulate(seats.get_or_insert(0), count);
        } else if is_seat_class(&token.designator) {
            accumulate(seats.get_or_insert(0), count);
            accumulate(configuration.classes.entry(token.designator).or_insert(0), count);
        } else if CARGO_DESIGNATORS.contains(&token.designator.as_str()) {
            accumulate(configuration.cargo.entry(token.designator).or_insert(0), count);
        } else {
            warn!(
                "Unknown aircraft configuration designator '{}' in '{}'",
                token.designator, raw
            );
            accumulate(configuration.unknown.entry(token.designator).or_insert(0), count);
        }
    }

    configuration.seats = seats;
    configuration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_input_is_empty() {
        assert_eq!(explode_aircraft_configuration(None), AircraftConfiguration::default());
        assert!(explode_aircraft_configuration(Some("   ")).is_empty());
    }

    #[test]
    fn test_bare_seat_count() {
        let configuration = explode_aircraft_configuration(Some("180"));
        assert_eq!(configuration.seats, Some(180));
        assert!(configuration.classes.is_empty());
        assert!(configuration.unknown.is_empty());
    }

    #[test]
    fn test_class_counts_sum_to_seats() {
        let configuration = explode_aircraft_configuration(Some("F8J42Y300"));
        assert_eq!(configuration.seats, Some(350));
        assert_eq!(configuration.classes.get("F"), Some(&8));
        assert_eq!(configuration.classes.get("J"), Some(&42));
        assert_eq!(configuration.classes.get("Y"), Some(&300));
        assert_eq!(configuration.classes.values().sum::<u32>(), 350);
    }

    #[test]
    fn test_version_separator() {
        let configuration = explode_aircraft_configuration(Some("C30M150VVA320"));
        assert_eq!(configuration.seats, Some(180));
        assert_eq!(configuration.version.as_deref(), Some("A320"));
        assert_eq!(configuration.raw.as_deref(), Some("C30M150VVA320"));
    }

    #[test]
    fn test_cargo_designators_do_not_count_as_seats() {
        let configuration = explode_aircraft_configuration(Some("Y189LL4"));
        assert_eq!(configuration.seats, Some(189));
        assert_eq!(configuration.cargo.get("LL"), Some(&4));
        assert!(!configuration.classes.contains_key("LL"));
    }

    #[test]
    fn test_unknown_designator_is_bucketed() {
        let configuration = explode_aircraft_configuration(Some("QQ12Y100"));
        assert_eq!(configuration.unknown.get("QQ"), Some(&12));
        assert_eq!(configuration.seats, Some(100));
    }

    #[test]
    fn test_trailing_designator_without_count() {
        let configuration = explode_aircraft_configuration(Some("Y100ZZ"));
        assert_eq!(configuration.seats, Some(100));
        assert_eq!(configuration.unknown.get("ZZ"), Some(&0));
    }

    #[test]
    fn test_seat_total_saturates() {
        let configuration = explode_aircraft_configuration(Some("Y4000000000C4000000000"));
        assert_eq!(configuration.seats, Some(u32::MAX));
        assert_eq!(configuration.classes.get("Y"), Some(&4_000_000_000));
        assert_eq!(configuration.classes.get("C"), Some(&4_000_000_000));
    }

    #[test]
    fn test_oversized_count_goes_to_unknown() {
        let configuration = explode_aircraft_configuration(Some("Y99999999999999999999J12"));
        assert_eq!(configuration.seats, Some(12));
        assert!(!configuration.classes.contains_key("Y"));
        assert_eq!(configuration.unknown.get("Y99999999999999999999"), Some(&0));
    }

    #[test]
    fn test_tokenize_order() {
        let tokens = tokenize("12 J4 Y");
        let pairs: Vec<_> = tokens
            .iter()
            .map(|t| (t.designator.as_str(), t.count()))
            .collect();
        assert_eq!(pairs, vec![("", Some(12)), ("J", Some(4)), ("Y", Some(0))]);
    }
}
