//! Timestamp value generators.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::Rng;

/// Midnight on 1 January of the year of `now`.
fn start_of_year(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now)
}

/// Random timestamp between the start of the current year and `now`, at
/// second precision.
pub fn generate_timestamp_this_year<R: Rng>(rng: &mut R, now: NaiveDateTime) -> NaiveDateTime {
    let start = start_of_year(now).and_utc().timestamp();
    let end = now.and_utc().timestamp();

    if start >= end {
        return start_of_year(now);
    }

    let random_ts = rng.gen_range(start..=end);
    chrono::DateTime::from_timestamp(random_ts, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or(now)
}

/// Random date between the start of the current year and `now`.
pub fn generate_date_this_year<R: Rng>(rng: &mut R, now: NaiveDateTime) -> NaiveDate {
    generate_timestamp_this_year(rng, now).date()
}
