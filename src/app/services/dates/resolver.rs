//! Resolution of record date and time tokens
//!
//! Three token shapes occur in practice:
//! - `DDMMM` day-month tokens in SIR rows, whose year comes from the season
//! - `DDMMMYY` tokens in SIM flight legs
//! - `YYYYMMDD` tokens in the CSV export
//!
//! Any of them may be the start/end-of-season sentinel.

use crate::app::models::{OperatingPeriod, PeriodBound, Season};
use crate::app::services::dates::season::season_dates;
use crate::constants::{
    BAD_MIDNIGHT, MIDNIGHT, SEASON_SENTINEL, SEASON_SENTINEL_SHORT, WINTER_ROLLOVER_MONTH,
    month_number,
};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use std::borrow::Cow;

/// Which end of a validity window a token describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundRole {
    Start,
    End,
}

fn is_sentinel(token: &str) -> bool {
    token == SEASON_SENTINEL || token == SEASON_SENTINEL_SHORT
}

fn parse_day(token: &str, digits: &str) -> Result<u32> {
    if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::malformed_date_token(token, "day must be two digits"));
    }
    digits
        .parse()
        .map_err(|_| Error::malformed_date_token(token, "day must be two digits"))
}

fn parse_month(token: &str, abbreviation: &str) -> Result<u32> {
    month_number(abbreviation)
        .ok_or_else(|| Error::malformed_date_token(token, "unknown month abbreviation"))
}

fn build_date(token: &str, year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::malformed_date_token(token, "no such calendar date"))
}

/// Split a `DDMMM` token into day and month
fn split_day_month(token: &str) -> Result<(u32, u32)> {
    if token.len() != 5 || !token.is_ascii() {
        return Err(Error::malformed_date_token(token, "expected DDMMM"));
    }
    Ok((parse_day(token, &token[..2])?, parse_month(token, &token[2..5])?))
}

/// Resolves date tokens against a season and century prefix
#[derive(Debug, Clone, Copy)]
pub struct DateResolver<'a> {
    season: Option<Season>,
    year_prefix: &'a str,
}

impl<'a> DateResolver<'a> {
    pub fn new(season: Option<Season>, year_prefix: &'a str) -> Self {
        Self {
            season,
            year_prefix,
        }
    }

    pub fn season(&self) -> Option<Season> {
        self.season
    }

    /// Bound for a sentinel token, open when no season is known yet
    pub fn sentinel_bound(&self, role: BoundRole) -> Result<PeriodBound> {
        match &self.season {
            Some(season) => {
                let (start, end) = season_dates(season, self.year_prefix)?;
                Ok(PeriodBound::Date(match role {
                    BoundRole::Start => start,
                    BoundRole::End => end,
                }))
            }
            None => Ok(PeriodBound::OpenSeason),
        }
    }

    /// Resolve a SIR `DDMMM[DDMMM]` window
    ///
    /// The year comes from the season code. In a winter season an end month
    /// before June moves the end into the next calendar year, and when it
    /// does a start month before June moves along with it. A missing end
    /// token means a single-day window.
    pub fn resolve_day_month_period(&self, from: &str, to: Option<&str>) -> Result<OperatingPeriod> {
        let to = to.unwrap_or(from);
        let season = self
            .season
            .ok_or_else(|| Error::missing_season_context(format!("resolving '{}'", from)))?;
        let year = season.start_year(self.year_prefix)?;

        let from_parts = if is_sentinel(from) { None } else { Some(split_day_month(from)?) };
        let to_parts = if is_sentinel(to) { None } else { Some(split_day_month(to)?) };

        let to_rolls = season.is_winter()
            && to_parts.is_some_and(|(_, month)| month < WINTER_ROLLOVER_MONTH);
        let from_rolls = season.is_winter()
            && from_parts.is_some_and(|(_, month)| month < WINTER_ROLLOVER_MONTH)
            && (to_rolls || to_parts.is_none());

        let from_bound = match from_parts {
            Some((day, month)) => {
                PeriodBound::Date(build_date(from, year + i32::from(from_rolls), month, day)?)
            }
            None => self.sentinel_bound(BoundRole::Start)?,
        };
        let to_bound = match to_parts {
            Some((day, month)) => {
                PeriodBound::Date(build_date(to, year + i32::from(to_rolls), month, day)?)
            }
            None => self.sentinel_bound(BoundRole::End)?,
        };

        Ok(OperatingPeriod {
            from: from_bound,
            to: to_bound,
        })
    }

    /// Resolve a SIM `DDMMMYY` token
    pub fn resolve_full_date(&self, token: &str, role: BoundRole) -> Result<PeriodBound> {
        if is_sentinel(token) {
            return self.sentinel_bound(role);
        }
        if token.len() != 7 || !token.is_ascii() {
            return Err(Error::malformed_date_token(token, "expected DDMMMYY"));
        }
        let day = parse_day(token, &token[..2])?;
        let month = parse_month(token, &token[2..5])?;
        let year_digits = &token[5..7];
        if !year_digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::malformed_date_token(token, "year must be two digits"));
        }
        let year: i32 = format!("{}{}", self.year_prefix, year_digits)
            .parse()
            .map_err(|_| Error::malformed_date_token(token, "invalid year"))?;
        Ok(PeriodBound::Date(build_date(token, year, month, day)?))
    }

    /// Resolve a SIM window; a missing end means a single day
    pub fn resolve_full_period(&self, from: &str, to: Option<&str>) -> Result<OperatingPeriod> {
        Ok(OperatingPeriod {
            from: self.resolve_full_date(from, BoundRole::Start)?,
            to: self.resolve_full_date(to.unwrap_or(from), BoundRole::End)?,
        })
    }

    /// Resolve a CSV `YYYYMMDD` token
    pub fn resolve_compact_date(&self, token: &str, role: BoundRole) -> Result<PeriodBound> {
        if is_sentinel(token) {
            return self.sentinel_bound(role);
        }
        if token.len() != 8 || !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::malformed_date_token(token, "expected YYYYMMDD"));
        }
        NaiveDate::parse_from_str(token, "%Y%m%d")
            .map(PeriodBound::Date)
            .map_err(|e| Error::malformed_date_token(token, e.to_string()))
    }

    /// Resolve a CSV window; a missing end means a single day
    pub fn resolve_compact_period(&self, from: &str, to: Option<&str>) -> Result<OperatingPeriod> {
        Ok(OperatingPeriod {
            from: self.resolve_compact_date(from, BoundRole::Start)?,
            to: self.resolve_compact_date(to.unwrap_or(from), BoundRole::End)?,
        })
    }
}

/// Close any open season bound of a window
pub fn resolve_period(
    period: &OperatingPeriod,
    season: Option<&Season>,
    year_prefix: &str,
) -> Result<(NaiveDate, NaiveDate)> {
    if let (Some(from), Some(to)) = (period.from.date(), period.to.date()) {
        return Ok((from, to));
    }
    let season = season.ok_or_else(|| {
        Error::missing_season_context("validity window uses the season sentinel")
    })?;
    let (start, end) = season_dates(season, year_prefix)?;
    Ok((period.from.date().unwrap_or(start), period.to.date().unwrap_or(end)))
}

/// Replace `2400` with `0000`; the flag reports whether a change was made
pub fn fix_bad_midnight(token: &str) -> (Cow<'_, str>, bool) {
    if token == BAD_MIDNIGHT {
        (Cow::Borrowed(MIDNIGHT), true)
    } else {
        (Cow::Borrowed(token), false)
    }
}

/// Parse an `HHMM` clock token, correcting bad midnight
pub fn parse_clock_time(token: &str) -> Result<(NaiveTime, bool)> {
    let (fixed, corrected) = fix_bad_midnight(token.trim());
    if fixed.len() != 4 || !fixed.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::malformed_date_token(token, "expected HHMM time"));
    }
    let time = NaiveTime::parse_from_str(&fixed, "%H%M")
        .map_err(|_| Error::malformed_date_token(token, "no such time of day"))?;
    Ok((time, corrected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolver(code: &str) -> DateResolver<'static> {
        DateResolver::new(Some(code.parse().unwrap()), "20")
    }

    fn dates(period: OperatingPeriod) -> (NaiveDate, NaiveDate) {
        (period.from.date().unwrap(), period.to.date().unwrap())
    }

    #[test]
    fn test_summer_day_month() {
        let period = resolver("S17").resolve_day_month_period("01APR", Some("30SEP")).unwrap();
        assert_eq!(dates(period), (date(2017, 4, 1), date(2017, 9, 30)));
    }

    #[test]
    fn test_winter_rollover_only_end() {
        let period = resolver("W17").resolve_day_month_period("29OCT", Some("24MAR")).unwrap();
        assert_eq!(dates(period), (date(2017, 10, 29), date(2018, 3, 24)));
    }

    #[test]
    fn test_winter_rollover_both_ends() {
        let period = resolver("W17").resolve_day_month_period("05JAN", Some("20FEB")).unwrap();
        assert_eq!(dates(period), (date(2018, 1, 5), date(2018, 2, 20)));
    }

    #[test]
    fn test_winter_without_rollover() {
        let period = resolver("W17").resolve_day_month_period("29OCT", Some("05NOV")).unwrap();
        assert_eq!(dates(period), (date(2017, 10, 29), date(2017, 11, 5)));
    }

    #[test]
    fn test_missing_end_is_single_day() {
        let period = resolver("W17").resolve_day_month_period("12FEB", None).unwrap();
        assert_eq!(dates(period), (date(2018, 2, 12), date(2018, 2, 12)));
    }

    #[test]
    fn test_sentinel_uses_season_bounds() {
        let r = resolver("W17");
        let period = r.resolve_full_period("00XXX00", Some("00XXX00")).unwrap();
        assert_eq!(dates(period), (date(2017, 10, 29), date(2018, 3, 30)));

        let period = r.resolve_day_month_period("01DEC", Some("00XXX")).unwrap();
        assert_eq!(dates(period), (date(2017, 12, 1), date(2018, 3, 30)));
    }

    #[test]
    fn test_sentinel_without_season_stays_open() {
        let r = DateResolver::new(None, "20");
        let period = r.resolve_compact_period("20171101", Some("00XXX00")).unwrap();
        assert_eq!(period.from, PeriodBound::Date(date(2017, 11, 1)));
        assert_eq!(period.to, PeriodBound::OpenSeason);

        assert!(matches!(
            resolve_period(&period, None, "20"),
            Err(Error::MissingSeasonContext { .. })
        ));

        let season: Season = "W17".parse().unwrap();
        let (from, to) = resolve_period(&period, Some(&season), "20").unwrap();
        assert_eq!((from, to), (date(2017, 11, 1), date(2018, 3, 30)));
    }

    #[test]
    fn test_day_month_requires_season() {
        let r = DateResolver::new(None, "20");
        assert!(matches!(
            r.resolve_day_month_period("01DEC", None),
            Err(Error::MissingSeasonContext { .. })
        ));
    }

    #[test]
    fn test_full_date() {
        let r = DateResolver::new(None, "20");
        assert_eq!(
            r.resolve_full_date("29OCT17", BoundRole::Start).unwrap(),
            PeriodBound::Date(date(2017, 10, 29))
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let r = resolver("S17");
        for token in ["32MAR", "01FOO", "1MAR", "30FEB"] {
            assert!(
                matches!(
                    r.resolve_day_month_period(token, None),
                    Err(Error::MalformedDateToken { .. })
                ),
                "{} should be malformed",
                token
            );
        }
        assert!(r.resolve_full_date("29OCTXX", BoundRole::End).is_err());
        assert!(r.resolve_compact_date("2017-10-29", BoundRole::End).is_err());
        assert!(r.resolve_compact_date("20171332", BoundRole::End).is_err());
    }

    #[test]
    fn test_bad_midnight() {
        assert_eq!(fix_bad_midnight("2400"), (Cow::Borrowed("0000"), true));
        assert_eq!(fix_bad_midnight("1200"), (Cow::Borrowed("1200"), false));

        let (time, corrected) = parse_clock_time("2400").unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert!(corrected);

        let (time, corrected) = parse_clock_time("0745").unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert!(!corrected);

        assert!(parse_clock_time("2561").is_err());
        assert!(parse_clock_time("12:0").is_err());
    }
}
