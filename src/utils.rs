use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use chrono_tz::Tz;
use thiserror::Error;

/// Problems with user-supplied input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid ticker option: {0} (expected 0 or 1)")]
    InvalidOption(String),
    #[error("No tickers entered")]
    NoTickers,
}

/// Year, month and day as typed by the user, bounds-checked but not calendar-checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInput {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Check a `YYYY-MM-DD` string against basic bounds.
///
/// The day is only checked against 1..=31, so `2024-02-31` passes here and is
/// rejected later by [`parse_trade_date`].
pub fn validate_date_input(date_str: &str, current_year: i32) -> Result<DateInput, InputError> {
    let invalid = || InputError::InvalidDate(date_str.to_string());

    if date_str.len() != 10 {
        return Err(invalid());
    }

    let mut parts = date_str.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    if year < 1 || year > current_year || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }

    Ok(DateInput { year, month, day })
}

/// Validate and convert a `YYYY-MM-DD` string into a calendar date
pub fn parse_trade_date(date_str: &str, current_year: i32) -> Result<NaiveDate, InputError> {
    let input = validate_date_input(date_str, current_year)?;
    NaiveDate::from_ymd_opt(input.year, input.month, input.day)
        .ok_or_else(|| InputError::InvalidDate(date_str.to_string()))
}

/// Step back one day, then keep stepping back over Saturdays and Sundays.
/// Exchange holidays are not considered.
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut previous = date - Duration::days(1);
    while matches!(previous.weekday(), Weekday::Sat | Weekday::Sun) {
        previous = previous - Duration::days(1);
    }
    previous
}

/// Convert a UTC epoch-millisecond timestamp into naive exchange-local time
pub fn to_exchange_local(timestamp_ms: i64, timezone: &Tz) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|utc| utc.with_timezone(timezone).naive_local())
}
