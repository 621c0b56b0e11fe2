//! Record uniformization
//!
//! Maps every parsed record shape onto one or two canonical [`Slot`]s, one
//! per direction at the reference airport. Dates are resolved here, so a
//! record whose dates cannot be resolved is dropped with a diagnostic while
//! the remaining records carry on.

use crate::app::models::records::{
    ArrivalRecord, CombinedRecord, CsvRecord, DepartureRecord, FlightDesignator, FlightLegRecord,
    ParsedRecord, RawLine, SegmentDataRecord,
};
use crate::app::models::{
    AircraftConfiguration, DaysOfOperation, Diagnostic, DiagnosticKind, Direction, Header,
    OperatingPeriod, PeriodBound, ScheduledTime, Season, Slot, SourceFormat, TimeReference,
};
use crate::app::services::aircraft_configuration::explode_aircraft_configuration;
use crate::app::services::dates::{DateResolver, parse_clock_time};
use crate::app::services::ssim_parser::field_parsers::{
    parse_frequency_rate, parse_seats, parse_utc_variation, split_stations,
};
use crate::app::services::ssim_parser::stats::ParseStats;
use crate::{Error, Result};
use tracing::debug;

/// File-level facts every record is uniformized against
#[derive(Debug, Clone, Copy)]
pub struct UniformizeContext<'a> {
    pub format: SourceFormat,
    pub header: &'a Header,
    /// Airport requested by the caller
    pub airport_code: Option<&'a str>,
    pub year_prefix: &'a str,
}

impl<'a> UniformizeContext<'a> {
    /// Reference airport of SIR and CSV rows
    fn reference_airport(&self) -> Option<String> {
        self.airport_code
            .map(str::to_string)
            .or_else(|| self.header.airport.clone())
    }

    fn resolver(&self, season: Option<Season>) -> DateResolver<'a> {
        DateResolver::new(season, self.year_prefix)
    }
}

/// Uniformize records into slots, recording dropped records in `stats`
pub fn uniformize(
    records: Vec<ParsedRecord>,
    ctx: &UniformizeContext<'_>,
    stats: &mut ParseStats,
) -> Vec<Slot> {
    if let (SourceFormat::Sir, Some(requested), Some(cleared)) =
        (ctx.format, ctx.airport_code, ctx.header.airport.as_deref())
    {
        if !requested.eq_ignore_ascii_case(cleared) {
            stats.push(Diagnostic::new(
                DiagnosticKind::AirportMismatch,
                format!(
                    "requested airport {} differs from clearance airport {}",
                    requested, cleared
                ),
            ));
        }
    }

    let mut slots: Vec<Slot> = Vec::new();
    let mut last_leg_slots: Option<std::ops::Range<usize>> = None;

    for record in records {
        let line = record.raw().number;
        let raw_text = record.raw().text.clone();

        let built = match record {
            ParsedRecord::Unparsed(_) => continue,
            ParsedRecord::SegmentData(segment) => {
                attach_segment_data(&segment, &mut slots, last_leg_slots.clone(), stats);
                continue;
            }
            ParsedRecord::Combined(r) => from_combined(r, ctx, stats),
            ParsedRecord::ArrivalOnly(r) => from_arrival(r, ctx, stats),
            ParsedRecord::DepartureOnly(r) => from_departure(r, ctx, stats),
            ParsedRecord::FlightLeg(r) => from_flight_leg(r, ctx, stats),
            ParsedRecord::Csv(r) => from_csv(r, ctx, stats),
        };

        let start = slots.len();
        match built {
            Ok(candidates) => {
                for slot in candidates {
                    match slot.validate() {
                        Ok(()) => slots.push(slot),
                        Err(e) => stats.record_dropped(
                            Diagnostic::new(DiagnosticKind::DroppedRecord, e.to_string())
                                .at_line(line)
                                .with_raw(raw_text.as_str()),
                        ),
                    }
                }
            }
            Err(e) => stats.record_dropped(Diagnostic::from_error(&e, line, &raw_text)),
        }
        last_leg_slots = Some(start..slots.len());
    }

    stats.slots_built = slots.len();
    slots
}

/// Slot with every optional field empty
fn base_slot(direction: Direction, format: SourceFormat, raw: &RawLine) -> Slot {
    Slot {
        direction,
        source_format: format,
        action_code: None,
        airline_designator: None,
        flight_number: None,
        operational_suffix: None,
        service_type: None,
        aircraft_type: None,
        airport: None,
        station: None,
        second_station: None,
        period: OperatingPeriod {
            from: PeriodBound::OpenSeason,
            to: PeriodBound::OpenSeason,
        },
        days_of_operation: DaysOfOperation::ALL,
        frequency_rate: 1,
        scheduled_time: None,
        day_offset: 0,
        aircraft_configuration: AircraftConfiguration::default(),
        additional_schedule_information: None,
        season: None,
        raw: raw.text.clone(),
        line_number: raw.number,
    }
}

fn apply_designator(slot: &mut Slot, designator: FlightDesignator) {
    slot.airline_designator = designator.airline_designator;
    slot.flight_number = designator.flight_number;
    slot.operational_suffix = designator.operational_suffix;
}

/// Absent weekday masks mean every day
fn days_of_operation(token: Option<&str>) -> DaysOfOperation {
    token.map_or(DaysOfOperation::ALL, DaysOfOperation::from_ssim)
}

fn required<'t>(token: Option<&'t str>, what: &str) -> Result<&'t str> {
    token.ok_or_else(|| Error::invalid_slot(format!("missing {}", what)))
}

/// Clock token to scheduled time, reporting bad midnight
fn scheduled_time(
    token: Option<&str>,
    reference: TimeReference,
    utc_offset_minutes: Option<i32>,
    raw: &RawLine,
    stats: &mut ParseStats,
) -> Result<Option<ScheduledTime>> {
    let Some(token) = token else {
        return Ok(None);
    };
    let (time, corrected) = parse_clock_time(token)?;
    if corrected {
        stats.push(
            Diagnostic::new(DiagnosticKind::BadMidnight, "time 2400 read as 0000")
                .at_line(raw.number)
                .with_raw(raw.text.as_str()),
        );
    }
    Ok(Some(ScheduledTime {
        time,
        reference,
        utc_offset_minutes,
    }))
}

/// Decoded configuration, reporting designators outside the known alphabets
fn aircraft_configuration(
    token: Option<&str>,
    raw: &RawLine,
    stats: &mut ParseStats,
) -> AircraftConfiguration {
    let configuration = explode_aircraft_configuration(token);
    if !configuration.unknown.is_empty() {
        let designators: Vec<&str> = configuration.unknown.keys().map(String::as_str).collect();
        stats.push(
            Diagnostic::new(
                DiagnosticKind::UnknownConfigurationDesignator,
                format!("unknown configuration designators {}", designators.join(",")),
            )
            .at_line(raw.number)
            .with_raw(raw.text.as_str()),
        );
    }
    configuration
}

/// Attributes shared by both directions of a SIR row
struct SirCommon {
    action_code: Option<String>,
    period: OperatingPeriod,
    days: DaysOfOperation,
    frequency_rate: u32,
    aircraft_type: Option<String>,
    configuration: AircraftConfiguration,
    remarks: Option<String>,
}

impl SirCommon {
    #[allow(clippy::too_many_arguments)]
    fn resolve(
        ctx: &UniformizeContext<'_>,
        action_code: Option<String>,
        period_from: Option<&str>,
        period_to: Option<&str>,
        days: Option<&str>,
        frequency_rate: Option<&str>,
        seats: Option<&str>,
        aircraft_type: Option<String>,
        remarks: Option<String>,
        raw: &RawLine,
        stats: &mut ParseStats,
    ) -> Result<Self> {
        let from = required(period_from, "period of operation")?;
        let period = ctx
            .resolver(ctx.header.season)
            .resolve_day_month_period(from, period_to)?;
        let seats = parse_seats(seats);
        Ok(Self {
            action_code,
            period,
            days: days_of_operation(days),
            frequency_rate: parse_frequency_rate(frequency_rate),
            aircraft_type,
            configuration: aircraft_configuration(seats.as_deref(), raw, stats),
            remarks,
        })
    }

    fn slot(&self, direction: Direction, ctx: &UniformizeContext<'_>, raw: &RawLine) -> Slot {
        let mut slot = base_slot(direction, SourceFormat::Sir, raw);
        slot.action_code = self.action_code.clone();
        slot.period = self.period;
        slot.days_of_operation = self.days;
        slot.frequency_rate = self.frequency_rate;
        slot.aircraft_type = self.aircraft_type.clone();
        slot.aircraft_configuration = self.configuration.clone();
        slot.additional_schedule_information = self.remarks.clone();
        slot.airport = ctx.reference_airport();
        slot.season = ctx.header.season;
        slot
    }
}

fn from_combined(
    r: CombinedRecord,
    ctx: &UniformizeContext<'_>,
    stats: &mut ParseStats,
) -> Result<Vec<Slot>> {
    let common = SirCommon::resolve(
        ctx,
        r.action_code,
        r.period_from.as_deref(),
        r.period_to.as_deref(),
        r.days_of_operation.as_deref(),
        r.frequency_rate.as_deref(),
        r.seats.as_deref(),
        r.aircraft_type,
        r.additional_schedule_information,
        &r.raw,
        stats,
    )?;
    let arrival_time = scheduled_time(r.arrival_time.as_deref(), TimeReference::Utc, None, &r.raw, stats)?;
    let departure_time =
        scheduled_time(r.departure_time.as_deref(), TimeReference::Utc, None, &r.raw, stats)?;

    let mut arrival = common.slot(Direction::Arrival, ctx, &r.raw);
    apply_designator(&mut arrival, r.arrival);
    arrival.service_type = r.arrival_service_type;
    arrival.station = r.previous_station;
    arrival.second_station = r.origin_station;
    arrival.scheduled_time = arrival_time;

    let mut departure = common.slot(Direction::Departure, ctx, &r.raw);
    apply_designator(&mut departure, r.departure);
    departure.service_type = r.departure_service_type;
    departure.station = r.next_station;
    departure.second_station = r.destination_station;
    departure.scheduled_time = departure_time;
    departure.day_offset = r
        .overnight_indicator
        .as_deref()
        .and_then(|d| d.parse::<u8>().ok())
        .unwrap_or(0);

    Ok(vec![arrival, departure])
}

fn from_arrival(
    r: ArrivalRecord,
    ctx: &UniformizeContext<'_>,
    stats: &mut ParseStats,
) -> Result<Vec<Slot>> {
    let common = SirCommon::resolve(
        ctx,
        r.action_code,
        r.period_from.as_deref(),
        r.period_to.as_deref(),
        r.days_of_operation.as_deref(),
        r.frequency_rate.as_deref(),
        r.seats.as_deref(),
        r.aircraft_type,
        r.additional_schedule_information,
        &r.raw,
        stats,
    )?;
    let mut slot = common.slot(Direction::Arrival, ctx, &r.raw);
    apply_designator(&mut slot, r.arrival);
    slot.service_type = r.service_type;
    slot.station = r.previous_station;
    slot.second_station = r.origin_station;
    slot.scheduled_time =
        scheduled_time(r.arrival_time.as_deref(), TimeReference::Utc, None, &r.raw, stats)?;
    Ok(vec![slot])
}

fn from_departure(
    r: DepartureRecord,
    ctx: &UniformizeContext<'_>,
    stats: &mut ParseStats,
) -> Result<Vec<Slot>> {
    let common = SirCommon::resolve(
        ctx,
        r.action_code,
        r.period_from.as_deref(),
        r.period_to.as_deref(),
        r.days_of_operation.as_deref(),
        r.frequency_rate.as_deref(),
        r.seats.as_deref(),
        r.aircraft_type,
        r.additional_schedule_information,
        &r.raw,
        stats,
    )?;
    let mut slot = common.slot(Direction::Departure, ctx, &r.raw);
    apply_designator(&mut slot, r.departure);
    slot.service_type = r.service_type;
    slot.station = r.next_station;
    slot.second_station = r.destination_station;
    slot.scheduled_time =
        scheduled_time(r.departure_time.as_deref(), TimeReference::Utc, None, &r.raw, stats)?;
    Ok(vec![slot])
}

/// SIM leg into a departure slot at its origin and an arrival slot at its destination
///
/// An arrival clock time earlier than the departure clock time between two
/// different stations is taken as a next-day arrival.
fn from_flight_leg(
    r: FlightLegRecord,
    ctx: &UniformizeContext<'_>,
    stats: &mut ParseStats,
) -> Result<Vec<Slot>> {
    let from = required(r.period_from.as_deref(), "period of operation")?;
    let period = ctx
        .resolver(ctx.header.season)
        .resolve_full_period(from, r.period_to.as_deref())?;
    let reference = ctx.header.time_mode.unwrap_or(TimeReference::Utc);

    let departure_time = scheduled_time(
        r.aircraft_departure_time.as_deref(),
        reference,
        parse_utc_variation(r.departure_utc_variation.as_deref()),
        &r.raw,
        stats,
    )?;
    let arrival_time = scheduled_time(
        r.aircraft_arrival_time.as_deref(),
        reference,
        parse_utc_variation(r.arrival_utc_variation.as_deref()),
        &r.raw,
        stats,
    )?;

    let overnight = match (&r.aircraft_arrival_time, &r.aircraft_departure_time) {
        (Some(arrival), Some(departure)) => {
            arrival < departure && r.departure_station != r.arrival_station
        }
        _ => false,
    };

    let template = {
        let mut slot = base_slot(Direction::Departure, SourceFormat::Sim, &r.raw);
        apply_designator(&mut slot, r.designator);
        slot.service_type = r.service_type;
        slot.aircraft_type = r.aircraft_type;
        slot.period = period;
        slot.days_of_operation = days_of_operation(r.days_of_operation.as_deref());
        slot.frequency_rate = parse_frequency_rate(r.frequency_rate.as_deref());
        slot.aircraft_configuration =
            aircraft_configuration(r.aircraft_configuration_version.as_deref(), &r.raw, stats);
        slot.season = ctx.header.season;
        slot
    };

    let touches = |station: &Option<String>| match ctx.airport_code {
        Some(airport) => station
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(airport)),
        None => true,
    };

    let mut slots = Vec::with_capacity(2);
    if departure_time.is_some() && touches(&r.departure_station) {
        let mut slot = template.clone();
        slot.direction = Direction::Departure;
        slot.airport = r.departure_station.clone();
        slot.station = r.arrival_station.clone();
        slot.scheduled_time = departure_time;
        slots.push(slot);
    }
    if arrival_time.is_some() && touches(&r.arrival_station) {
        let mut slot = template;
        slot.direction = Direction::Arrival;
        slot.airport = r.arrival_station.clone();
        slot.station = r.departure_station.clone();
        slot.scheduled_time = arrival_time;
        slot.day_offset = u8::from(overnight);
        slots.push(slot);
    }

    if slots.is_empty() {
        debug!(
            "Leg on line {} does not touch the requested airport",
            r.raw.number
        );
    }
    Ok(slots)
}

fn from_csv(r: CsvRecord, ctx: &UniformizeContext<'_>, stats: &mut ParseStats) -> Result<Vec<Slot>> {
    let direction: Direction = required(r.direction.as_deref(), "direction")?.parse()?;
    let season = r.season.as_deref().map(str::parse::<Season>).transpose()?;
    let from = required(r.period_from.as_deref(), "period of operation")?;
    let period = ctx
        .resolver(season)
        .resolve_compact_period(from, r.period_to.as_deref())?;

    let raw = match &r.source_raw {
        Some(source) => RawLine::new(r.raw.number, source.as_str()),
        None => r.raw.clone(),
    };
    let mut slot = base_slot(direction, SourceFormat::Csv, &raw);
    slot.action_code = r.action_code;
    apply_designator(&mut slot, r.designator);
    slot.airport = r.airport.or_else(|| ctx.reference_airport());
    slot.service_type = r.service_type;
    slot.aircraft_type = r.aircraft_type;
    slot.period = period;
    slot.days_of_operation = days_of_operation(r.days_of_operation.as_deref());
    slot.frequency_rate = parse_frequency_rate(r.frequency_rate.as_deref());
    slot.scheduled_time =
        scheduled_time(r.scheduled_time.as_deref(), TimeReference::Utc, None, &r.raw, stats)?;
    let seats = parse_seats(r.seats.as_deref());
    slot.aircraft_configuration = aircraft_configuration(seats.as_deref(), &r.raw, stats);
    slot.additional_schedule_information = r.remarks;
    slot.season = season;

    let (first, last) = split_stations(r.stations.as_deref());
    match direction {
        Direction::Departure => {
            slot.station = first;
            slot.second_station = last;
        }
        Direction::Arrival => match last {
            Some(previous) => {
                slot.station = Some(previous);
                slot.second_station = first;
            }
            None => slot.station = first,
        },
    }

    Ok(vec![slot])
}

/// Append segment data to the slots of the leg before it
fn attach_segment_data(
    segment: &SegmentDataRecord,
    slots: &mut [Slot],
    last_leg: Option<std::ops::Range<usize>>,
    stats: &mut ParseStats,
) {
    let Some(data) = segment.data.as_deref() else {
        return;
    };
    let Some(range) = last_leg.filter(|range| !range.is_empty()) else {
        stats.push(
            Diagnostic::new(
                DiagnosticKind::DroppedRecord,
                "segment data without a preceding flight leg",
            )
            .at_line(segment.raw.number)
            .with_raw(segment.raw.text.trim_end()),
        );
        return;
    };

    let text = match &segment.data_element_identifier {
        Some(identifier) => format!("{} {}", identifier, data),
        None => data.to_string(),
    };
    for slot in &mut slots[range] {
        match &mut slot.additional_schedule_information {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(&text);
            }
            None => slot.additional_schedule_information = Some(text.clone()),
        }
    }
}
