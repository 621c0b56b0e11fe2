//! IATA season calendar

use crate::app::models::{Season, SeasonKind};
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};

/// Last `weekday` of a month, found by walking back from the month's final day
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let mut day = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .ok_or_else(|| {
            Error::malformed_date_token(format!("{}-{:02}", year, month), "date out of range")
        })?;

    while day.weekday() != weekday {
        day = day.pred_opt().ok_or_else(|| {
            Error::malformed_date_token(format!("{}-{:02}", year, month), "date out of range")
        })?;
    }
    Ok(day)
}

/// First and last day of a season
///
/// Summer runs from the last Saturday of March to the last Saturday of
/// October. Winter starts the day after that October Saturday and ends the
/// day before the following year's last Saturday of March.
pub fn season_dates(season: &Season, year_prefix: &str) -> Result<(NaiveDate, NaiveDate)> {
    let year = season.start_year(year_prefix)?;
    let summer_end = last_weekday_of_month(year, 10, Weekday::Sat)?;

    match season.kind {
        SeasonKind::Summer => {
            let start = last_weekday_of_month(year, 3, Weekday::Sat)?;
            Ok((start, summer_end))
        }
        SeasonKind::Winter => {
            let next_summer_start = last_weekday_of_month(year + 1, 3, Weekday::Sat)?;
            let start = summer_end
                .succ_opt()
                .ok_or_else(|| Error::malformed_date_token(season.to_string(), "date out of range"))?;
            let end = next_summer_start
                .pred_opt()
                .ok_or_else(|| Error::malformed_date_token(season.to_string(), "date out of range"))?;
            Ok((start, end))
        }
    }
}

/// First and last day of the season named by a code such as `W17`
pub fn find_season_dates(code: &str, year_prefix: &str) -> Result<(NaiveDate, NaiveDate)> {
    let season: Season = code.parse()?;
    season_dates(&season, year_prefix)
}
