//! Weekly recurrence of a single slot
//!
//! A slot is one weekly rule over every weekday of its mask, starting at the
//! window start. Weeks run Monday to Sunday and a frequency rate of `n` keeps
//! every `n`-th week counted from the week the window opens in.

use crate::app::models::{DaysOfOperation, Flight, Season, Slot};
use crate::app::services::dates::resolve_period;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use rrule::RRuleSet;

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn weekly_rule(from: NaiveDate, until: NaiveDate, days: DaysOfOperation, interval: u32) -> String {
    let by_day: Vec<&str> = days.weekdays().into_iter().map(weekday_code).collect();
    format!(
        "DTSTART:{}T000000Z\nRRULE:FREQ=WEEKLY;INTERVAL={};BYDAY={};WKST=MO;UNTIL={}T235959Z",
        from.format("%Y%m%d"),
        interval,
        by_day.join(","),
        until.format("%Y%m%d"),
    )
}

/// Operating dates of a window in ascending order
pub fn occurrence_dates(
    from: NaiveDate,
    to: NaiveDate,
    days: DaysOfOperation,
    frequency_rate: u32,
) -> Result<Vec<NaiveDate>> {
    if from > to {
        return Err(Error::invalid_slot(format!(
            "window {} to {} is inverted",
            from, to
        )));
    }
    if frequency_rate < 1 {
        return Err(Error::invalid_slot("frequency rate must be at least 1"));
    }
    if days.is_empty() {
        return Ok(Vec::new());
    }

    let rule: RRuleSet = weekly_rule(from, to, days, frequency_rate)
        .parse()
        .map_err(|e: rrule::RRuleError| Error::recurrence(e.to_string()))?;
    let result = rule.all(u16::MAX);
    if result.limited {
        return Err(Error::recurrence(format!(
            "more than {} occurrences between {} and {}",
            u16::MAX,
            from,
            to
        )));
    }

    // DTSTART itself is only an occurrence when it falls on a masked weekday
    let mut dates: Vec<NaiveDate> = result
        .dates
        .iter()
        .map(|occurrence| occurrence.date_naive())
        .filter(|date| *date >= from && *date <= to && days.contains(date.weekday()))
        .collect();
    dates.sort_unstable();
    dates.dedup();
    Ok(dates)
}

/// Expand one slot into its flights
///
/// `season` resolves open start/end-of-season bounds and takes precedence
/// over the season the slot was read with. Fails with
/// [`Error::MissingSeasonContext`] when an open bound has neither.
pub fn expand_slot(slot: &Slot, season: Option<&Season>, year_prefix: &str) -> Result<Vec<Flight>> {
    slot.validate()?;
    let season = season.or(slot.season.as_ref());
    let (from, to) = resolve_period(&slot.period, season, year_prefix)?;

    let dates = occurrence_dates(from, to, slot.days_of_operation, slot.frequency_rate)?;
    Ok(dates
        .into_iter()
        .map(|date| Flight::from_slot(slot, date))
        .collect())
}
