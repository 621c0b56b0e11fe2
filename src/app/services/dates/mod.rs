//! Date resolution for schedule records
//!
//! `season` computes IATA season boundaries; `resolver` turns the partial
//! and sentinel date tokens found in records into calendar dates.

pub mod resolver;
pub mod season;

pub use resolver::{BoundRole, DateResolver, fix_bad_midnight, parse_clock_time, resolve_period};
pub use season::{find_season_dates, last_weekday_of_month, season_dates};
